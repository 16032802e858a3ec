// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation.
//!
//! Single-pass predictive recursive descent with one-token lookahead and
//! precedence climbing for binary expressions. Two pieces of state thread
//! through every production: a context bitset tracking which grammatical
//! regions the parser currently sits inside (pushed and popped around each
//! nested region), and the id of the node currently under construction
//! (pushed and popped around each delegation), which lets `finalize_node`
//! link every child to its parent without a separate pass.

use enumflags2::{bitflags, BitFlags};
use unholy_ast::{
    Node, NodeArray, NodeData, NodeFlag, NodeFlags, NodeId, SemanticElement, SyntaxKind,
    SyntaxTree,
};
use unholy_scanner::Scanner;

use crate::SyntaxError;

/// Grammatical regions the parser can sit inside.
///
/// `SignatureDeclarations` is reserved for the planned function-type
/// grammar and is never entered today.
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextFlag {
    SourceElements = 1 << 0,
    BlockStatements = 1 << 1,
    VarDeclarations = 1 << 2,
    FuncDeclarations = 1 << 3,
    ParameterDeclarations = 1 << 4,
    SignatureDeclarations = 1 << 5,
    ArgExpressions = 1 << 6,
}

pub type Context = BitFlags<ContextFlag>;

/// The parser for Unholy source code.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    file_name: String,
    /// The current token: the one most recently committed by `consume` or
    /// a successful speculation.
    token: SemanticElement,
    context: Context,
    context_stack: Vec<Context>,
    /// The node currently under construction. `None` only before the root
    /// is opened and after it is closed.
    parent: Option<NodeId>,
    parent_stack: Vec<Option<NodeId>>,
    tree: SyntaxTree,
}

impl<'a> Parser<'a> {
    pub fn new(file_name: &str, source: &'a str) -> Self {
        Self {
            scanner: Scanner::new(source),
            file_name: file_name.to_string(),
            token: SemanticElement::default(),
            context: ContextFlag::SourceElements.into(),
            context_stack: Vec::new(),
            parent: None,
            parent_stack: Vec::new(),
            tree: SyntaxTree::new(),
        }
    }

    /// Parse the whole source into a tree rooted at a `SourceFile`.
    ///
    /// The first error aborts: the partially built arena is dropped with
    /// the parser and never observable.
    pub fn parse(mut self) -> Result<SyntaxTree, SyntaxError> {
        let root = self.begin_node(SyntaxKind::SourceFile);
        self.tree.set_root(root);
        self.push_parent(root);

        self.consume(&[])?;
        let mut statements = self.open_array();
        while self.token.kind != SyntaxKind::EndOfFileToken {
            let statement = self.parse_statement()?;
            statements.items.push(statement);
            self.consume(&[])?;
        }
        self.close_array(&mut statements);

        self.pop_parent();
        let file_name = std::mem::take(&mut self.file_name);
        self.finish_node(root, NodeData::SourceFile {
            file_name,
            statements,
        });

        debug_assert!(self.context_stack.is_empty(), "context stack must drain");
        debug_assert!(self.parent_stack.is_empty(), "parent stack must drain");
        Ok(self.tree)
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    /// Pull the next token. With a non-empty `expected` list, error unless
    /// the pulled token's kind is in it; the message names the first
    /// expected kind.
    fn consume(&mut self, expected: &[SyntaxKind]) -> Result<(), SyntaxError> {
        self.token = self.scanner.next_token()?;
        if !expected.is_empty() && !expected.contains(&self.token.kind) {
            return Err(ParseError::expected(expected[0], &self.token).into());
        }
        Ok(())
    }

    /// Speculatively pull the next token; commit iff `predicate` accepts it.
    /// On a miss the scanner is fully restored and the current token is
    /// untouched.
    fn speculate(
        &mut self,
        predicate: impl Fn(&SemanticElement) -> bool,
    ) -> Result<Option<SemanticElement>, SyntaxError> {
        let committed = self.scanner.try_scan(|s| {
            let token = s.next_token()?;
            Ok(predicate(&token).then_some(token))
        })?;
        if let Some(token) = &committed {
            self.token = token.clone();
        }
        Ok(committed)
    }

    /// Commit the next token iff its kind is one of `kinds`.
    fn consume_optional(
        &mut self,
        kinds: &[SyntaxKind],
    ) -> Result<Option<SemanticElement>, SyntaxError> {
        self.speculate(|t| kinds.contains(&t.kind))
    }

    /// Read the next token without committing anything.
    fn peek(&mut self) -> Result<SemanticElement, SyntaxError> {
        let token = self.scanner.look_ahead(|s| s.next_token())?;
        Ok(token)
    }

    /// Match the current token without advancing.
    fn assert_kind(&self, expected: &[SyntaxKind]) -> Result<(), SyntaxError> {
        if expected.contains(&self.token.kind) {
            Ok(())
        } else {
            Err(ParseError::expected(expected[0], &self.token).into())
        }
    }

    // =========================================================================
    // Context and parent chain
    // =========================================================================

    fn push_context(&mut self, context: Context) {
        self.context_stack.push(self.context);
        self.context = context;
    }

    fn pop_context(&mut self) {
        self.context = self
            .context_stack
            .pop()
            .expect("pop_context without matching push");
    }

    /// Loose: at least one of `required` must be set. Strict: the current
    /// context must equal `required` exactly.
    fn assert_context(&self, required: Context, loose: bool) -> Result<(), SyntaxError> {
        let satisfied = if loose {
            self.context.intersects(required)
        } else {
            self.context == required
        };
        if satisfied {
            Ok(())
        } else {
            Err(ParseError::context(&self.token).into())
        }
    }

    fn push_parent(&mut self, id: NodeId) {
        self.parent_stack.push(self.parent);
        self.parent = Some(id);
    }

    fn pop_parent(&mut self) {
        self.parent = self
            .parent_stack
            .pop()
            .expect("pop_parent without matching push");
    }

    // =========================================================================
    // Node construction
    // =========================================================================

    /// Open a node at the current token's position. Its payload and length
    /// are attached by `finish_node` once the production has run.
    fn begin_node(&mut self, kind: SyntaxKind) -> NodeId {
        self.begin_node_at(kind, self.token.line, self.token.column, self.token.pos)
    }

    fn begin_node_at(&mut self, kind: SyntaxKind, line: u32, column: u32, pos: usize) -> NodeId {
        self.tree.alloc(Node {
            kind,
            data: NodeData::Incomplete,
            line,
            column,
            pos,
            length: 0,
            flags: NodeFlags::empty(),
            parent: None,
        })
    }

    /// Link `id` to the node under construction (unless something already
    /// claimed it) and fix its length from the scanner position.
    fn finalize_node(&mut self, id: NodeId) {
        let end = self.scanner.get_pos();
        let parent = self.parent;
        let node = self.tree.node_mut(id);
        if node.parent.is_none() {
            node.parent = parent;
        }
        node.length = end - node.pos;
    }

    fn finish_node(&mut self, id: NodeId, data: NodeData) {
        self.tree.node_mut(id).data = data;
        self.finalize_node(id);
    }

    /// Re-claim an already finalized node as a child of `parent`. Binary
    /// folds need this: the left operand is finished before the fold node
    /// wrapping it exists.
    fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        self.tree.node_mut(child).parent = Some(parent);
    }

    /// A leaf node backed entirely by the current token.
    fn make_node_from_token(&mut self, kind: SyntaxKind, data: NodeData) -> NodeId {
        let id = self.begin_node(kind);
        self.finish_node(id, data);
        id
    }

    fn make_identifier(&mut self) -> NodeId {
        let name = self.token.raw_text.clone();
        self.make_node_from_token(SyntaxKind::Identifier, NodeData::Identifier { name })
    }

    /// Lift the current token into the tree, e.g. a binary operator.
    fn make_token_node(&mut self) -> NodeId {
        let kind = self.token.kind;
        self.make_node_from_token(kind, NodeData::Token)
    }

    fn node_start(&self, id: NodeId) -> (u32, u32, usize) {
        let node = self.tree.node(id);
        (node.line, node.column, node.pos)
    }

    /// Open a child list at the current token's position.
    fn open_array(&self) -> NodeArray {
        NodeArray::new(self.token.line, self.token.column, self.token.pos)
    }

    /// Close a child list at the current token (its delimiter).
    fn close_array(&self, array: &mut NodeArray) {
        array.length = self.token.pos.saturating_sub(array.pos);
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Dispatch on the current token, which is the statement's first.
    fn parse_statement(&mut self) -> Result<NodeId, SyntaxError> {
        match self.token.kind {
            SyntaxKind::OpenBraceToken => self.parse_block_statement(),
            SyntaxKind::LetKeyword => self.parse_var_declaration_statement(),
            SyntaxKind::FuncKeyword => self.parse_func_declaration_statement(),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::EndOfFileToken => Err(ParseError::unexpected_eof(&self.token).into()),
            kind if kind.starts_expression() => self.parse_expression_statement(),
            _ => Err(ParseError::not_a_statement(&self.token).into()),
        }
    }

    fn parse_block_statement(&mut self) -> Result<NodeId, SyntaxError> {
        self.assert_kind(&[SyntaxKind::OpenBraceToken])?;
        let block = self.begin_node(SyntaxKind::BlockStatement);
        self.push_context(self.context | ContextFlag::BlockStatements);
        self.push_parent(block);

        self.consume(&[])?;
        let mut statements = self.open_array();
        while self.token.kind != SyntaxKind::CloseBraceToken {
            let statement = self.parse_statement()?;
            let child_flags = self.tree.node(statement).flags;
            if child_flags.intersects(NodeFlag::HasError | NodeFlag::ChildHasError) {
                self.tree.node_mut(block).flags |= NodeFlag::ChildHasError;
            }
            statements.items.push(statement);
            self.consume(&[])?;
        }
        self.close_array(&mut statements);

        self.pop_parent();
        self.pop_context();
        self.finish_node(block, NodeData::Block { statements });
        Ok(block)
    }

    fn parse_var_declaration_statement(&mut self) -> Result<NodeId, SyntaxError> {
        self.assert_context(
            ContextFlag::SourceElements | ContextFlag::BlockStatements,
            true,
        )?;
        let statement = self.begin_node(SyntaxKind::VarDeclarationStatement);
        self.push_context(ContextFlag::VarDeclarations.into());
        self.push_parent(statement);

        let declaration = self.parse_var_declaration()?;
        self.consume(&[SyntaxKind::SemicolonToken])?;

        self.pop_parent();
        self.pop_context();
        self.finish_node(statement, NodeData::VarDeclStmt { declaration });
        Ok(statement)
    }

    fn parse_var_declaration(&mut self) -> Result<NodeId, SyntaxError> {
        self.consume(&[SyntaxKind::Identifier])?;
        let declaration = self.begin_node(SyntaxKind::VarDeclaration);
        self.push_parent(declaration);

        let name = self.make_identifier();
        let ty = match self.consume_optional(&[SyntaxKind::ColonToken])? {
            Some(_) => Some(self.parse_type()?),
            None => None,
        };
        let initializer = match self.consume_optional(&[SyntaxKind::EqualsToken])? {
            Some(_) => {
                self.consume(&[])?;
                Some(self.parse_expression()?)
            }
            None => None,
        };

        self.pop_parent();
        self.finish_node(declaration, NodeData::VarDecl {
            name,
            ty,
            initializer,
        });
        Ok(declaration)
    }

    fn parse_func_declaration_statement(&mut self) -> Result<NodeId, SyntaxError> {
        // Functions only nest at the top level; a func inside a block or
        // another function is a context violation.
        self.assert_context(ContextFlag::SourceElements.into(), false)?;
        let statement = self.begin_node(SyntaxKind::FuncDeclarationStatement);
        self.push_context(ContextFlag::FuncDeclarations.into());
        self.push_parent(statement);

        let declaration = self.parse_func_declaration()?;

        self.pop_parent();
        self.pop_context();
        self.finish_node(statement, NodeData::FuncDeclStmt { declaration });
        Ok(statement)
    }

    fn parse_func_declaration(&mut self) -> Result<NodeId, SyntaxError> {
        self.consume(&[SyntaxKind::Identifier])?;
        let declaration = self.begin_node(SyntaxKind::FuncDeclaration);
        self.push_parent(declaration);

        let name = self.make_identifier();
        self.consume(&[SyntaxKind::OpenParenToken])?;
        let params = self.parse_parameter_list()?;
        self.consume(&[SyntaxKind::ColonToken])?;
        let ty = self.parse_type()?;
        self.consume(&[SyntaxKind::OpenBraceToken])?;
        let body = self.parse_block_statement()?;

        self.pop_parent();
        self.finish_node(declaration, NodeData::FuncDecl {
            name,
            params,
            ty,
            body,
        });
        Ok(declaration)
    }

    fn parse_parameter_list(&mut self) -> Result<NodeArray, SyntaxError> {
        self.push_context(ContextFlag::ParameterDeclarations.into());
        self.consume(&[])?;
        let mut params = self.open_array();
        if self.token.kind != SyntaxKind::CloseParenToken {
            loop {
                let param = self.parse_parameter_declaration()?;
                params.items.push(param);
                self.consume(&[SyntaxKind::CommaToken, SyntaxKind::CloseParenToken])?;
                if self.token.kind == SyntaxKind::CloseParenToken {
                    break;
                }
                self.consume(&[])?;
            }
        }
        self.close_array(&mut params);
        self.pop_context();
        Ok(params)
    }

    fn parse_parameter_declaration(&mut self) -> Result<NodeId, SyntaxError> {
        self.assert_context(ContextFlag::ParameterDeclarations.into(), true)?;
        self.assert_kind(&[SyntaxKind::Identifier])?;
        let declaration = self.begin_node(SyntaxKind::ParameterDeclaration);
        self.push_parent(declaration);

        let name = self.make_identifier();
        self.consume(&[SyntaxKind::ColonToken])?;
        let ty = self.parse_type()?;

        self.pop_parent();
        self.finish_node(declaration, NodeData::ParameterDecl { name, ty });
        Ok(declaration)
    }

    /// Exactly the keyword types.
    fn parse_type(&mut self) -> Result<NodeId, SyntaxError> {
        self.consume(&[
            SyntaxKind::BoolKeyword,
            SyntaxKind::IntKeyword,
            SyntaxKind::VoidKeyword,
        ])?;
        let kind = self.token.kind;
        Ok(self.make_node_from_token(kind, NodeData::KeywordType))
    }

    fn parse_if_statement(&mut self) -> Result<NodeId, SyntaxError> {
        self.assert_context(ContextFlag::BlockStatements.into(), true)?;
        let statement = self.begin_node(SyntaxKind::IfStatement);
        self.push_parent(statement);

        self.consume(&[SyntaxKind::OpenParenToken])?;
        self.consume(&[])?;
        let condition = self.parse_expression()?;
        self.consume(&[SyntaxKind::CloseParenToken])?;

        // The branch is any statement; `{` dispatch builds the whole block.
        self.consume(&[])?;
        let then_statement = self.parse_statement()?;

        let else_statement = match self.consume_optional(&[SyntaxKind::ElseKeyword])? {
            Some(_) => {
                self.consume(&[])?;
                Some(self.parse_statement()?)
            }
            None => None,
        };

        self.pop_parent();
        self.finish_node(statement, NodeData::If {
            condition,
            then_statement,
            else_statement,
        });
        Ok(statement)
    }

    fn parse_return_statement(&mut self) -> Result<NodeId, SyntaxError> {
        // Strict: only valid directly inside a function body's blocks.
        self.assert_context(
            ContextFlag::FuncDeclarations | ContextFlag::BlockStatements,
            false,
        )?;
        self.assert_kind(&[SyntaxKind::ReturnKeyword])?;
        let statement = self.begin_node(SyntaxKind::ReturnStatement);
        self.push_parent(statement);

        let expression = match self.consume_optional(&[SyntaxKind::SemicolonToken])? {
            Some(_) => None,
            None => {
                self.consume(&[])?;
                let expression = self.parse_expression()?;
                self.consume(&[SyntaxKind::SemicolonToken])?;
                Some(expression)
            }
        };

        self.pop_parent();
        self.finish_node(statement, NodeData::Return { expression });
        Ok(statement)
    }

    fn parse_expression_statement(&mut self) -> Result<NodeId, SyntaxError> {
        self.assert_context(ContextFlag::BlockStatements.into(), true)?;
        let statement = self.begin_node(SyntaxKind::ExpressionStatement);
        self.push_parent(statement);

        let expression = self.parse_expression()?;
        self.consume(&[SyntaxKind::SemicolonToken])?;

        self.pop_parent();
        self.finish_node(statement, NodeData::ExprStmt { expression });
        Ok(statement)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Entered with the expression's first token current.
    fn parse_expression(&mut self) -> Result<NodeId, SyntaxError> {
        self.parse_assignment_expression_or_higher()
    }

    /// Assignment is right-associative, so it is folded by right-recursion
    /// here rather than by the left-associative climb below.
    fn parse_assignment_expression_or_higher(&mut self) -> Result<NodeId, SyntaxError> {
        let left = self.parse_binary_expression_or_higher(0)?;
        if self
            .speculate(|t| t.kind.is_assignment_operator())?
            .is_some()
        {
            let (line, column, pos) = self.node_start(left);
            let binary = self.begin_node_at(SyntaxKind::BinaryExpression, line, column, pos);
            self.push_parent(binary);

            let operator = self.make_token_node();
            self.consume(&[])?;
            let right = self.parse_assignment_expression_or_higher()?;

            self.pop_parent();
            self.set_parent(left, binary);
            self.finish_node(binary, NodeData::Binary {
                left,
                operator,
                right,
            });
            return Ok(binary);
        }
        Ok(left)
    }

    /// Precedence climbing. Folds while the speculated operator binds
    /// strictly tighter than `precedence`; the strict comparison is what
    /// makes same-precedence chains left-associative.
    fn parse_binary_expression_or_higher(
        &mut self,
        precedence: i8,
    ) -> Result<NodeId, SyntaxError> {
        let mut left = self.parse_primary_expression()?;
        loop {
            let operator_token = self.speculate(|t| {
                !t.kind.is_assignment_operator() && t.kind.binary_precedence() > precedence
            })?;
            let Some(operator_token) = operator_token else {
                break;
            };
            let next_precedence = operator_token.kind.binary_precedence();

            let (line, column, pos) = self.node_start(left);
            let binary = self.begin_node_at(SyntaxKind::BinaryExpression, line, column, pos);
            self.push_parent(binary);

            let operator = self.make_token_node();
            self.consume(&[])?;
            let right = self.parse_binary_expression_or_higher(next_precedence)?;

            self.pop_parent();
            self.set_parent(left, binary);
            self.finish_node(binary, NodeData::Binary {
                left,
                operator,
                right,
            });
            left = binary;
        }
        Ok(left)
    }

    fn parse_primary_expression(&mut self) -> Result<NodeId, SyntaxError> {
        match self.token.kind {
            SyntaxKind::Identifier => {
                if self.peek()?.kind == SyntaxKind::OpenParenToken {
                    self.parse_call_expression()
                } else {
                    Ok(self.make_identifier())
                }
            }
            SyntaxKind::IntegerLiteral => {
                let text = self
                    .token
                    .value
                    .clone()
                    .unwrap_or_else(|| self.token.raw_text.clone());
                Ok(self.make_node_from_token(
                    SyntaxKind::IntegerLiteral,
                    NodeData::IntegerLiteral { text },
                ))
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let kind = self.token.kind;
                Ok(self.make_node_from_token(kind, NodeData::BoolLiteral))
            }
            _ => Err(ParseError::expected_expression(&self.token).into()),
        }
    }

    /// Entered with the callee identifier current and `(` peeked.
    fn parse_call_expression(&mut self) -> Result<NodeId, SyntaxError> {
        let call = self.begin_node(SyntaxKind::CallExpression);
        self.push_parent(call);

        let callee = self.make_identifier();
        self.consume(&[SyntaxKind::OpenParenToken])?;
        let args = self.parse_argument_list()?;

        self.pop_parent();
        self.finish_node(call, NodeData::Call { callee, args });
        Ok(call)
    }

    fn parse_argument_list(&mut self) -> Result<NodeArray, SyntaxError> {
        self.push_context(ContextFlag::ArgExpressions.into());
        self.consume(&[])?;
        let mut args = self.open_array();
        if self.token.kind != SyntaxKind::CloseParenToken {
            loop {
                self.assert_context(ContextFlag::ArgExpressions.into(), true)?;
                let argument = self.parse_expression()?;
                args.items.push(argument);
                self.consume(&[SyntaxKind::CommaToken, SyntaxKind::CloseParenToken])?;
                if self.token.kind == SyntaxKind::CloseParenToken {
                    break;
                }
                self.consume(&[])?;
            }
        }
        self.close_array(&mut args);
        self.pop_context();
        Ok(args)
    }
}

/// A parser error with the offending token and a friendly message.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub element: SemanticElement,
    pub message: String,
    pub hint: Option<String>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    fn expected(expected: SyntaxKind, found: &SemanticElement) -> Self {
        let message = format!(
            "Expected {}, found {}",
            expected.display_name(),
            found.describe()
        );
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self {
            element: found.clone(),
            message,
            hint,
        }
    }

    fn expected_expression(found: &SemanticElement) -> Self {
        Self {
            element: found.clone(),
            message: format!("Expected expression, found {}", found.describe()),
            hint: Some("try a value, variable, or function call".to_string()),
        }
    }

    fn not_a_statement(found: &SemanticElement) -> Self {
        Self {
            element: found.clone(),
            message: format!("Not a statement: {}", found.describe()),
            hint: Some(
                "statements start with 'let', 'func', 'if', 'return', '{', or an expression"
                    .to_string(),
            ),
        }
    }

    fn unexpected_eof(found: &SemanticElement) -> Self {
        Self {
            element: found.clone(),
            message: "Unexpected end of file".to_string(),
            hint: Some("a block or statement is unfinished".to_string()),
        }
    }

    fn context(found: &SemanticElement) -> Self {
        Self {
            element: found.clone(),
            message: format!("{} is not allowed in this context", found.describe()),
            hint: None,
        }
    }
}
