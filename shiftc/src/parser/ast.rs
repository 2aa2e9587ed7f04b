use std::fmt::{self, Display, Formatter};

use super::parser::{PResult, Parse, ParseError, Parser, Precedence};
use crate::lexer::token::{Position, TokenKind};

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Function(Function),
    Import(Import),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
}

impl<'a> Parse<'a> for Statement {
    fn parse(parser: &mut Parser<'a>, precedence: Precedence) -> PResult<Self> {
        match parser.current_token.kind {
            TokenKind::Return => Ok(Self::Return(ReturnStatement::parse(parser, precedence)?)),
            _ => Ok(Self::Expression(ExpressionStatement::parse(
                parser, precedence,
            )?)),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Function(func) => func.fmt(f),
            Statement::Import(import) => import.fmt(f),
            Statement::Return(ret) => ret.fmt(f),
            Statement::Expression(expr) => expr.fmt(f),
        }
    }
}

/// `(name?, type_name)` of one input or return parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: Option<String>,
    pub type_name: String,
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{} ", name)?;
        }
        write!(f, "{}", self.type_name)
    }
}

/// `name(params...) : return` shared by function definitions and imports.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub name: String,
    pub input_params: Vec<Parameter>,
    pub return_params: Vec<Parameter>,
}

impl Signature {
    /// Called with the `fn` keyword as the current token; leaves the last
    /// signature token (closing `)` or final return type) current.
    fn parse(parser: &mut Parser<'_>) -> PResult<Self> {
        let fn_pos = parser.current_token.pos;
        if !parser.next_token_is(TokenKind::Ident) {
            return Err(ParseError::missing_function_name(Position::new(
                fn_pos.line,
                fn_pos.column + 2,
            )));
        }
        parser.next_token();

        let name = parser.current_token.literal.clone();

        parser.expect_peek(TokenKind::Lparen)?;

        let input_params = Self::parse_input_params(parser)?;
        let return_params = Self::parse_return_params(parser)?;

        Ok(Signature {
            name,
            input_params,
            return_params,
        })
    }

    fn parse_input_params(parser: &mut Parser<'_>) -> PResult<Vec<Parameter>> {
        let mut params = vec![];

        if parser.next_token_is(TokenKind::Rparen) {
            parser.next_token();
            return Ok(params);
        }

        let mut comma_pos: Option<Position> = None;
        loop {
            parser.next_token();

            if !parser.current_token_is(TokenKind::Ident) {
                return Err(match comma_pos {
                    Some(pos) => ParseError::trailing_comma(pos),
                    None => ParseError::missing(TokenKind::Rparen, parser.current_token.pos),
                });
            }
            let name = parser.current_token.literal.clone();
            let name_pos = parser.current_token.pos;

            parser.next_token();
            if !parser.current_token_is(TokenKind::Ident) {
                return Err(ParseError::missing_parameter_type(name_pos));
            }

            params.push(Parameter {
                name: Some(name),
                type_name: parser.current_token.literal.clone(),
            });

            if parser.next_token_is(TokenKind::Comma) {
                comma_pos = Some(parser.next_token.pos);
                parser.next_token();
                continue;
            }

            parser.expect_peek(TokenKind::Rparen)?;
            return Ok(params);
        }
    }

    /// Zero or more bare type names after `:`. More than one is syntactically
    /// accepted here and rejected during lowering.
    fn parse_return_params(parser: &mut Parser<'_>) -> PResult<Vec<Parameter>> {
        let mut params = vec![];

        if parser.next_token_is(TokenKind::Colon) {
            parser.next_token();
            while parser.next_token_is(TokenKind::Ident) {
                parser.next_token();
                params.push(Parameter {
                    name: None,
                    type_name: parser.current_token.literal.clone(),
                });
            }
        }

        Ok(params)
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        for (i, param) in self.input_params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")?;

        if !self.return_params.is_empty() {
            write!(f, " :")?;
            for param in &self.return_params {
                write!(f, " {}", param)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub signature: Signature,
    pub body: Block,
}

impl<'a> Parse<'a> for Function {
    fn parse(parser: &mut Parser<'a>, precedence: Precedence) -> PResult<Self> {
        let signature = Signature::parse(parser)?;

        parser.expect_peek(TokenKind::Lcurly)?;

        let body = Block::parse(parser, precedence)?;

        Ok(Function { signature, body })
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "\n{} {{{}\n}}\n", self.signature, self.body)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    pub signature: Signature,
}

impl<'a> Parse<'a> for Import {
    fn parse(parser: &mut Parser<'a>, _precedence: Precedence) -> PResult<Self> {
        parser.expect_peek(TokenKind::Func)?;

        let signature = Signature::parse(parser)?;

        Ok(Import { signature })
    }
}

impl Display for Import {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "\nimport {}\n", self.signature)
    }
}

/// Statement list of one `{ ... }`; `depth` is the nesting level used only
/// for indentation when printing.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub depth: usize,
}

impl<'a> Parse<'a> for Block {
    fn parse(parser: &mut Parser<'a>, precedence: Precedence) -> PResult<Self> {
        parser.depth += 1;
        let depth = parser.depth;

        parser.next_token();

        let mut statements = vec![];
        while !parser.current_token_is(TokenKind::Rcurly)
            && !parser.current_token_is(TokenKind::Eof)
        {
            statements.push(Statement::parse(parser, precedence)?);
            parser.next_token();
        }

        if parser.current_token_is(TokenKind::Eof) {
            return Err(ParseError::missing(
                TokenKind::Rcurly,
                parser.next_token.pos,
            ));
        }

        parser.depth -= 1;

        Ok(Block { statements, depth })
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "\n{}{}", "\t".repeat(self.depth), statement)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
}

impl<'a> Parse<'a> for ReturnStatement {
    fn parse(parser: &mut Parser<'a>, _precedence: Precedence) -> PResult<Self> {
        if parser.next_token_is(TokenKind::Rcurly) || parser.next_token_is(TokenKind::Eof) {
            return Ok(ReturnStatement { value: None });
        }
        if parser.next_token_is(TokenKind::Semicolon) {
            parser.next_token();
            return Ok(ReturnStatement { value: None });
        }

        parser.next_token();
        let value = Expression::parse(parser, Precedence::Lowest)?;

        if parser.next_token_is(TokenKind::Semicolon) {
            parser.next_token();
        }

        Ok(ReturnStatement { value: Some(value) })
    }
}

impl Display for ReturnStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "return")?;
        if let Some(value) = &self.value {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
}

impl<'a> Parse<'a> for ExpressionStatement {
    fn parse(parser: &mut Parser<'a>, _precedence: Precedence) -> PResult<Self> {
        let expression = Expression::parse(parser, Precedence::Lowest)?;

        if parser.next_token_is(TokenKind::Semicolon) {
            parser.next_token();
        }

        Ok(ExpressionStatement { expression })
    }
}

impl Display for ExpressionStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.expression.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntLit(IntegerLiteral),
    FloatLit(FloatLiteral),
    StringLit(StringLiteral),
    Infix(InfixExpression),
    Call(CallExpression),
    InitAssign(InitAssignExpression),
    Assign(AssignExpression),
    If(IfExpression),
    Grouped(Box<Expression>),
}

impl<'a> Parse<'a> for Expression {
    fn parse(parser: &mut Parser<'a>, precedence: Precedence) -> PResult<Self> {
        let mut left = match parser.current_token.kind {
            TokenKind::Ident => Expression::Identifier(Identifier {
                name: parser.current_token.literal.clone(),
            }),
            TokenKind::Int => Expression::IntLit(IntegerLiteral::parse(parser, precedence)?),
            TokenKind::Float => Expression::FloatLit(FloatLiteral {
                value: parser.current_token.literal.clone(),
            }),
            TokenKind::Str => Expression::StringLit(StringLiteral {
                value: parser.current_token.literal.clone(),
            }),
            TokenKind::If => Expression::If(IfExpression::parse(parser, precedence)?),

            TokenKind::Lparen => {
                parser.next_token();
                let inner = Expression::parse(parser, Precedence::Lowest)?;

                parser.expect_peek(TokenKind::Rparen)?;

                Expression::Grouped(Box::new(inner))
            }

            _ => {
                return Err(ParseError::illegal_symbol(
                    &parser.current_token.literal,
                    parser.current_token.pos,
                ))
            }
        };

        loop {
            if parser.next_token_is(TokenKind::Semicolon) {
                break;
            }
            if precedence >= parser.next_precedence() {
                break;
            }

            match parser.next_token.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Asterisk
                | TokenKind::NotEq => {
                    parser.next_token();
                    left = Expression::Infix(InfixExpression::parse(parser, left)?);
                }
                TokenKind::Assign => {
                    parser.next_token();
                    left = Expression::Assign(AssignExpression::parse(parser, left)?);
                }
                TokenKind::InitAssign => {
                    parser.next_token();
                    left = Expression::InitAssign(InitAssignExpression::parse(parser, left)?);
                }
                TokenKind::Lparen => {
                    parser.next_token();
                    left = Expression::Call(CallExpression::parse(parser, left)?);
                }
                _ => break,
            }
        }

        Ok(left)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident.name),
            Expression::IntLit(int) => write!(f, "{}", int.value),
            Expression::FloatLit(float) => write!(f, "{}", float.value),
            Expression::StringLit(string) => write!(f, "{:?}", string.value),
            Expression::Infix(infix) => infix.fmt(f),
            Expression::Call(call) => call.fmt(f),
            Expression::InitAssign(init) => init.fmt(f),
            Expression::Assign(assign) => assign.fmt(f),
            Expression::If(if_expr) => if_expr.fmt(f),
            Expression::Grouped(inner) => write!(f, "({})", inner),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntegerLiteral {
    pub value: i32,
}

impl<'a> Parse<'a> for IntegerLiteral {
    fn parse(parser: &mut Parser<'a>, _precedence: Precedence) -> PResult<Self> {
        let literal = &parser.current_token.literal;

        let value = literal
            .parse::<i32>()
            .map_err(|_| ParseError::bad_integer(literal, parser.current_token.pos))?;

        Ok(IntegerLiteral { value })
    }
}

/// Kept as written; floats are accepted by the lexer but have no codegen.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatLiteral {
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringLiteral {
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InfixExpression {
    pub left: Box<Expression>,
    pub operator: String,
    pub right: Box<Expression>,
}

impl InfixExpression {
    fn parse(parser: &mut Parser<'_>, left: Expression) -> PResult<Self> {
        let operator = parser.current_token.literal.clone();
        let precedence = parser.current_precedence();

        parser.next_token();

        let right = Expression::parse(parser, precedence)?;

        Ok(InfixExpression {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }
}

impl Display for InfixExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpression {
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
}

impl CallExpression {
    fn parse(parser: &mut Parser<'_>, function: Expression) -> PResult<Self> {
        let mut arguments = vec![];

        if parser.next_token_is(TokenKind::Rparen) {
            parser.next_token();
            return Ok(CallExpression {
                function: Box::new(function),
                arguments,
            });
        }

        parser.next_token();
        arguments.push(Expression::parse(parser, Precedence::Lowest)?);

        while parser.next_token_is(TokenKind::Comma) {
            parser.next_token();
            parser.next_token();
            arguments.push(Expression::parse(parser, Precedence::Lowest)?);
        }

        parser.expect_peek(TokenKind::Rparen)?;

        Ok(CallExpression {
            function: Box::new(function),
            arguments,
        })
    }
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// `x := e` — introduces a new binding during lowering. The declared type
/// slot is carried for lowering; the current grammar never fills it.
#[derive(Clone, Debug, PartialEq)]
pub struct InitAssignExpression {
    pub target: Box<Expression>,
    pub declared_type: Option<String>,
    pub value: Box<Expression>,
}

impl InitAssignExpression {
    fn parse(parser: &mut Parser<'_>, target: Expression) -> PResult<Self> {
        parser.next_token();

        let value = Expression::parse(parser, Precedence::Lowest)?;

        Ok(InitAssignExpression {
            target: Box::new(target),
            declared_type: None,
            value: Box::new(value),
        })
    }
}

impl Display for InitAssignExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} := {}", self.target, self.value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignExpression {
    pub target: Box<Expression>,
    pub value: Box<Expression>,
}

impl AssignExpression {
    fn parse(parser: &mut Parser<'_>, target: Expression) -> PResult<Self> {
        parser.next_token();

        let value = Expression::parse(parser, Precedence::Lowest)?;

        Ok(AssignExpression {
            target: Box::new(target),
            value: Box::new(value),
        })
    }
}

impl Display for AssignExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.target, self.value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfExpression {
    pub condition: Box<Expression>,
    pub body: Block,
}

impl<'a> Parse<'a> for IfExpression {
    fn parse(parser: &mut Parser<'a>, precedence: Precedence) -> PResult<Self> {
        let if_pos = parser.current_token.pos;

        parser.next_token();
        let condition = Expression::parse(parser, Precedence::Lowest)?;

        if !parser.next_token_is(TokenKind::Lcurly) {
            return Err(ParseError::missing_if_block(Position::new(
                if_pos.line,
                if_pos.column + 2,
            )));
        }
        parser.next_token();

        let body = Block::parse(parser, precedence)?;

        Ok(IfExpression {
            condition: Box::new(condition),
            body,
        })
    }
}

impl Display for IfExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "if {} {{{}\n{}}}",
            self.condition,
            self.body,
            "\t".repeat(self.body.depth - 1)
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl<'a> Parse<'a> for Program {
    fn parse(parser: &mut Parser<'a>, precedence: Precedence) -> PResult<Self> {
        let mut statements = vec![];

        while !parser.current_token_is(TokenKind::Eof) {
            let statement = match parser.current_token.kind {
                TokenKind::Func => Statement::Function(Function::parse(parser, precedence)?),
                TokenKind::Import => Statement::Import(Import::parse(parser, precedence)?),
                _ => return Err(ParseError::non_declaration(parser.current_token.pos)),
            };

            statements.push(statement);
            parser.next_token();
        }

        Ok(Self { statements })
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            statement.fmt(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Program {
        let mut lexer = Lexer::new(source.to_string());
        let mut parser = Parser::new(&mut lexer);
        Program::parse(&mut parser, Precedence::Lowest).unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        let mut lexer = Lexer::new(source.to_string());
        let mut parser = Parser::new(&mut lexer);
        Program::parse(&mut parser, Precedence::Lowest).unwrap_err()
    }

    fn ident(name: &str) -> Expression {
        Expression::Identifier(Identifier {
            name: name.to_string(),
        })
    }

    fn int(value: i32) -> Expression {
        Expression::IntLit(IntegerLiteral { value })
    }

    fn infix(left: Expression, operator: &str, right: Expression) -> Expression {
        Expression::Infix(InfixExpression {
            left: Box::new(left),
            operator: operator.to_string(),
            right: Box::new(right),
        })
    }

    fn expr_stmt(expression: Expression) -> Statement {
        Statement::Expression(ExpressionStatement { expression })
    }

    #[test]
    fn parse_function_statements() {
        let source = "
fn Calc(a i32, b i32) : i32 {
	c := 2
	c = c + a
	return add(a, b) + c
}
";
        let program = parse(source);
        assert_eq!(program.statements.len(), 1);

        let Statement::Function(func) = &program.statements[0] else {
            panic!("expected function, got {:?}", program.statements[0]);
        };

        assert_eq!(func.signature.name, "Calc");
        assert_eq!(
            func.signature.input_params,
            vec![
                Parameter {
                    name: Some("a".to_string()),
                    type_name: "i32".to_string(),
                },
                Parameter {
                    name: Some("b".to_string()),
                    type_name: "i32".to_string(),
                },
            ]
        );
        assert_eq!(
            func.signature.return_params,
            vec![Parameter {
                name: None,
                type_name: "i32".to_string(),
            }]
        );

        let expected = vec![
            expr_stmt(Expression::InitAssign(InitAssignExpression {
                target: Box::new(ident("c")),
                declared_type: None,
                value: Box::new(int(2)),
            })),
            expr_stmt(Expression::Assign(AssignExpression {
                target: Box::new(ident("c")),
                value: Box::new(infix(ident("c"), "+", ident("a"))),
            })),
            Statement::Return(ReturnStatement {
                value: Some(infix(
                    Expression::Call(CallExpression {
                        function: Box::new(ident("add")),
                        arguments: vec![ident("a"), ident("b")],
                    }),
                    "+",
                    ident("c"),
                )),
            }),
        ];

        assert_eq!(func.body.statements, expected);
    }

    #[test]
    fn parse_import() {
        let program = parse("\nimport fn assert(expected i32, actual i32)\n\nfn main() {\n}\n");

        let Statement::Import(import) = &program.statements[0] else {
            panic!("expected import");
        };
        assert_eq!(import.signature.name, "assert");
        assert_eq!(import.signature.input_params.len(), 2);
        assert!(import.signature.return_params.is_empty());

        assert!(matches!(program.statements[1], Statement::Function(_)));
    }

    #[test]
    fn parse_if_expression() {
        let source = "
fn main() {
	if 21 != res {
		assert(21, res)
	}
}
";
        let program = parse(source);
        let Statement::Function(func) = &program.statements[0] else {
            panic!("expected function");
        };

        let Statement::Expression(stmt) = &func.body.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::If(if_expr) = &stmt.expression else {
            panic!("expected if, got {:?}", stmt.expression);
        };

        assert_eq!(*if_expr.condition, infix(int(21), "!=", ident("res")));
        assert_eq!(if_expr.body.depth, 2);
        assert_eq!(if_expr.body.statements.len(), 1);
    }

    #[test]
    fn parse_grouped_expression() {
        let source = "fn f() {\n\treturn 5 + (2 - 1)\n}\n";
        let program = parse(source);

        let Statement::Function(func) = &program.statements[0] else {
            panic!("expected function");
        };
        let Statement::Return(ret) = &func.body.statements[0] else {
            panic!("expected return");
        };

        assert_eq!(
            ret.value,
            Some(infix(
                int(5),
                "+",
                Expression::Grouped(Box::new(infix(int(2), "-", int(1)))),
            ))
        );
    }

    #[test]
    fn product_binds_tighter_than_sum() {
        let program = parse("fn f() {\n\treturn 1 + 2 * 3\n}\n");

        let Statement::Function(func) = &program.statements[0] else {
            panic!("expected function");
        };
        let Statement::Return(ret) = &func.body.statements[0] else {
            panic!("expected return");
        };

        assert_eq!(ret.value, Some(infix(int(1), "+", infix(int(2), "*", int(3)))));
    }

    #[test]
    fn string_and_float_literals() {
        let program = parse("fn main() {\n\terror(\"bad\")\n\tx := 0.5\n}\n");

        let Statement::Function(func) = &program.statements[0] else {
            panic!("expected function");
        };

        let Statement::Expression(call_stmt) = &func.body.statements[0] else {
            panic!("expected expression statement");
        };
        let Expression::Call(call) = &call_stmt.expression else {
            panic!("expected call");
        };
        assert_eq!(
            call.arguments,
            vec![Expression::StringLit(StringLiteral {
                value: "bad".to_string(),
            })]
        );

        let Statement::Expression(init_stmt) = &func.body.statements[1] else {
            panic!("expected expression statement");
        };
        let Expression::InitAssign(init) = &init_stmt.expression else {
            panic!("expected init assign");
        };
        assert_eq!(
            *init.value,
            Expression::FloatLit(FloatLiteral {
                value: "0.5".to_string(),
            })
        );
    }

    #[test]
    fn multiple_return_types_parse() {
        // Rejected later, during lowering.
        let program = parse("fn f() : i32 i32 {\n}\n");
        let Statement::Function(func) = &program.statements[0] else {
            panic!("expected function");
        };
        assert_eq!(func.signature.return_params.len(), 2);
    }

    #[test]
    fn print_round_trips_source() {
        let source = "
fn Calc(a i32, b i32) : i32 {
	c := 2
	c = c + a
	return add(a, b) + c
}

fn add(a i32, b i32) : i32 {
	return a + b
}
";
        let program = parse(source);
        assert_eq!(program.to_string(), source);
    }

    #[test]
    fn print_reparse_preserves_structure() {
        let sources = [
            "fn main() {}",
            "import fn assert(expected i32, actual i32)\nfn main() {\n\tres := Calc(6, 1)\n\tif 21 != res {\n\t\tassert(21, res)\n\t}\n}",
            "fn f() {\n\treturn 5 + (2 - 1)\n}",
            "import fn error(msg string)\nfn main() { error(\"bad\") }",
            "fn f() {\n\tx := 0.5\n\treturn\n}",
            "fn f(a i32) : i32 {\n\treturn (a + 1) * 2\n}",
        ];

        for source in sources {
            let program = parse(source);
            let reparsed = parse(&program.to_string());
            assert_eq!(reparsed, program, "round trip of {:?}", source);
        }
    }

    #[test]
    fn parse_errors() {
        let tests = [
            ("fn () {}", "missing function name", 1, 3),
            ("fn A() {return ~2}", "illegal symbol ~", 1, 16),
            ("fn A() {return 5 + (2 - 1}", "missing )", 1, 26),
            ("fn Add {}", "missing (", 1, 8),
            ("fn Add( {}", "missing )", 1, 9),
            ("fn Add()", "missing {", 1, 9),
            ("fn Add() {", "missing }", 1, 12),
            (
                "fn Add(a i32, b) {}",
                "missing function parameter type",
                1,
                15,
            ),
            (
                "fn Add(a i32, b i32,) {}",
                "trailing comma in parameters",
                1,
                20,
            ),
            (
                "fn Add(a i32, b i32, {}",
                "trailing comma in parameters",
                1,
                20,
            ),
            (
                "fn A() { if x y }",
                "missing { at beginning of if block",
                1,
                12,
            ),
            (
                "return 5",
                "non-declaration statement outside function body",
                1,
                1,
            ),
            (
                "fn A() { x := 5000000000 }",
                "could not parse \"5000000000\" as integer",
                1,
                15,
            ),
        ];

        for (i, (input, message, line, column)) in tests.into_iter().enumerate() {
            let err = parse_err(input);
            assert_eq!(err.message(), message, "tests[{}] {:?}", i, input);
            assert_eq!(
                err.position().line,
                line,
                "tests[{}] {:?} - line",
                i,
                input
            );
            assert_eq!(
                err.position().column,
                column,
                "tests[{}] {:?} - column",
                i,
                input
            );
        }
    }
}
