use std::fmt::Display;
use std::mem;

use super::module::{
    DataSegment, ExportEntry, FuncSig, FuncType, FunctionBody, ImportEntry, LocalEntry, MemoryType,
    Module, Operation, ResultType, ValueType,
};
use super::symbol_table::{SymbolScope, SymbolTable};
use crate::parser::ast::{
    AssignExpression, CallExpression, Expression, Function, Identifier, IfExpression,
    InfixExpression, InitAssignExpression, Program, Signature, Statement, StringLiteral,
};
use crate::types::types::Type;

/// Imports carry no module qualifier in source; the runtime resolves them
/// under this module name.
pub const IMPORT_MODULE: &str = "env";

/// Lowering diagnostics. Accumulated over the whole pass and surfaced
/// together; they carry no positions because they arise after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerError {
    FunctionTypeNotFound(String),
    UndefinedVariable(String),
    UnknownOperator(String),
    UnknownType(String),
    MultipleReturnTypes(String),
}

impl Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompilerError::FunctionTypeNotFound(name) => {
                write!(f, "function type for {} not found", name)
            }
            CompilerError::UndefinedVariable(name) => {
                write!(f, "variable {} is undefined", name)
            }
            CompilerError::UnknownOperator(op) => write!(f, "unknown operator {}", op),
            CompilerError::UnknownType(name) => write!(f, "unknown type {}", name),
            CompilerError::MultipleReturnTypes(name) => {
                write!(
                    f,
                    "fn {}(...) : (...) multiple return types is not implemented",
                    name
                )
            }
        }
    }
}

/// The lowering pass: walks the AST twice (signatures, then bodies) and
/// populates the Wasm module. Index counters are per-compilation.
pub struct Compiler {
    symbol_table: SymbolTable,
    errors: Vec<CompilerError>,
    function_index: u32,
    data_offset: i32,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            symbol_table: SymbolTable::new(),
            errors: vec![],
            function_index: 0,
            data_offset: 0,
        }
    }

    pub fn errors(&self) -> &[CompilerError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<CompilerError> {
        self.errors
    }

    pub fn compile_program(&mut self, program: &Program) -> Module {
        let mut module = Module::new();

        // Phase A: signatures. Imports are walked first so they claim the
        // low end of the combined function index space.
        for statement in &program.statements {
            if let Statement::Import(import) = statement {
                let func_type = self.compile_signature(&import.signature, &mut module);
                module.imports.push(ImportEntry {
                    module_name: IMPORT_MODULE.to_string(),
                    field_name: import.signature.name.clone(),
                    func_type,
                });
            }
        }

        for statement in &program.statements {
            if let Statement::Function(function) = statement {
                let mut func_type = self.compile_signature(&function.signature, &mut module);
                if is_exported(&function.signature.name) {
                    func_type.exported = true;
                    module.exports.push(ExportEntry {
                        field: func_type.name.clone(),
                        index: func_type.function_index,
                    });
                }
                module.functions.push(func_type);
            }
        }

        // Phase B: bodies.
        for statement in &program.statements {
            if let Statement::Function(function) = statement {
                let body = self.compile_function_body(function, &mut module);
                module.bodies.push(body);
            }
        }

        if !module.data.is_empty() {
            module.memory = Some(MemoryType {
                flags: 0,
                initial: 1,
                maximum: None,
            });
        }

        module
    }

    fn compile_signature(&mut self, signature: &Signature, module: &mut Module) -> FuncType {
        let mut param_types = vec![];
        for param in &signature.input_params {
            let name = param.name.clone().unwrap_or_default();
            match self.lookup_type(&param.type_name) {
                Type::String => {
                    param_types.push(ValueType {
                        name: Some(name.clone()),
                        ty: Type::I32,
                    });
                    param_types.push(ValueType {
                        name: Some(format!("{}_len", name)),
                        ty: Type::I32,
                    });
                }
                scalar => param_types.push(ValueType {
                    name: Some(name),
                    ty: scalar,
                }),
            }
        }

        if signature.return_params.len() > 1 {
            self.errors
                .push(CompilerError::MultipleReturnTypes(signature.name.clone()));
        }

        let result_type = signature.return_params.first().map(|param| {
            let ty = match self.lookup_type(&param.type_name) {
                // A two-slot result has no wire representation.
                Type::String => {
                    self.errors
                        .push(CompilerError::UnknownType("string".to_string()));
                    Type::I32
                }
                scalar => scalar,
            };
            ResultType { ty }
        });

        let type_index = module.type_index_for(FuncSig {
            params: param_types.iter().map(|param| param.ty).collect(),
            result: result_type.map(|result| result.ty),
        });

        let function_index = self.function_index;
        self.function_index += 1;

        FuncType {
            type_index,
            function_index,
            name: signature.name.clone(),
            exported: false,
            param_types,
            result_type,
        }
    }

    fn compile_function_body(&mut self, function: &Function, module: &mut Module) -> FunctionBody {
        let mut body = FunctionBody {
            func_name: function.signature.name.clone(),
            locals: vec![],
            code: vec![],
        };

        self.enter_scope();

        for param in &function.signature.input_params {
            // Unknown names were already diagnosed during phase A.
            let ty = Type::from_name(&param.type_name).unwrap_or(Type::I32);
            let name = param.name.clone().unwrap_or_default();
            self.symbol_table.define(&name, ty);
        }

        for statement in &function.body.statements {
            let operations = self.compile_statement(statement, &mut body, module);
            body.code.extend(operations);
        }

        self.leave_scope();

        body
    }

    fn compile_statement(
        &mut self,
        statement: &Statement,
        body: &mut FunctionBody,
        module: &mut Module,
    ) -> Vec<Operation> {
        match statement {
            // The value is left on the stack; the function's implicit result
            // picks it up, so `return` must end the function.
            Statement::Return(ret) => match &ret.value {
                Some(value) => self.compile_expression(value, body, module),
                None => vec![],
            },
            Statement::Expression(stmt) => self.compile_expression(&stmt.expression, body, module),
            // Declarations never appear inside a body.
            Statement::Function(_) | Statement::Import(_) => vec![],
        }
    }

    fn compile_expression(
        &mut self,
        expression: &Expression,
        body: &mut FunctionBody,
        module: &mut Module,
    ) -> Vec<Operation> {
        match expression {
            Expression::IntLit(int) => vec![Operation::ConstI32 { value: int.value }],
            Expression::FloatLit(_) => {
                self.errors
                    .push(CompilerError::UnknownType("float".to_string()));
                vec![]
            }
            Expression::StringLit(string) => self.compile_string(string, module),
            Expression::Identifier(ident) => self.compile_identifier(ident),
            Expression::Infix(infix) => self.compile_infix(infix, body, module),
            Expression::Call(call) => self.compile_call(call, body, module),
            Expression::InitAssign(init) => self.compile_init_assign(init, body, module),
            Expression::Assign(assign) => self.compile_assign(assign, body, module),
            Expression::If(if_expr) => self.compile_if(if_expr, body, module),
            Expression::Grouped(inner) => self.compile_expression(inner, body, module),
        }
    }

    /// Appends the literal's bytes to the data section and lowers to the
    /// (offset, length) constant pair.
    fn compile_string(&mut self, string: &StringLiteral, module: &mut Module) -> Vec<Operation> {
        let bytes = string.value.as_bytes().to_vec();
        let size = bytes.len() as u32;
        let offset = self.data_offset;

        module.data.push(DataSegment {
            index: module.data.len() as u32,
            offset,
            size,
            bytes,
        });
        self.data_offset += size as i32;

        vec![
            Operation::ConstI32 { value: offset },
            Operation::ConstI32 {
                value: size as i32,
            },
        ]
    }

    fn compile_identifier(&mut self, ident: &Identifier) -> Vec<Operation> {
        let symbol = match self.symbol_table.resolve(&ident.name) {
            Some(symbol) => symbol.clone(),
            None => {
                self.errors
                    .push(CompilerError::UndefinedVariable(ident.name.clone()));
                return vec![];
            }
        };

        match symbol.scope {
            // A string value loads both of its slots, in order.
            SymbolScope::Local => (0..symbol.ty.width())
                .map(|slot| Operation::GetLocal {
                    name: symbol.name.clone(),
                    index: symbol.index + slot,
                })
                .collect(),
            // Globals have no load path.
            SymbolScope::Global => vec![],
        }
    }

    fn compile_infix(
        &mut self,
        infix: &InfixExpression,
        body: &mut FunctionBody,
        module: &mut Module,
    ) -> Vec<Operation> {
        let mut result = self.compile_expression(&infix.left, body, module);
        result.extend(self.compile_expression(&infix.right, body, module));

        match infix.operator.as_str() {
            "+" => result.push(Operation::Add),
            "-" => result.push(Operation::Sub),
            "*" => result.push(Operation::Mul),
            "!=" => result.push(Operation::NotEq),
            op => self
                .errors
                .push(CompilerError::UnknownOperator(op.to_string())),
        }

        result
    }

    fn compile_call(
        &mut self,
        call: &CallExpression,
        body: &mut FunctionBody,
        module: &mut Module,
    ) -> Vec<Operation> {
        let name = call.function.to_string();

        let function_index = match module.func_type(&name) {
            Some(func) => func.function_index,
            None => {
                self.errors
                    .push(CompilerError::FunctionTypeNotFound(name));
                return vec![];
            }
        };

        let mut args = vec![];
        for arg in &call.arguments {
            args.extend(self.compile_expression(arg, body, module));
        }

        vec![Operation::Call {
            name,
            function_index,
            args,
        }]
    }

    fn compile_init_assign(
        &mut self,
        init: &InitAssignExpression,
        body: &mut FunctionBody,
        module: &mut Module,
    ) -> Vec<Operation> {
        let name = init.target.to_string();

        let ty = match init.declared_type.as_deref() {
            Some(type_name) => Some(self.lookup_type(type_name)),
            None => self.infer_type(&init.value, module),
        };
        let ty = match ty {
            Some(ty) => ty,
            None => {
                // A float value already reports itself when lowered below.
                if !matches!(init.value.as_ref(), Expression::FloatLit(_)) {
                    self.errors
                        .push(CompilerError::UnknownType(kind_name(&init.value).to_string()));
                }
                Type::I32
            }
        };

        let symbol = self.symbol_table.define(&name, ty);

        let mut result = self.compile_expression(&init.value, body, module);

        if symbol.scope == SymbolScope::Global {
            result.push(Operation::SetGlobal {
                name: symbol.name,
                index: symbol.index,
            });
        } else {
            body.locals.push(LocalEntry {
                count: 1,
                value_type: ValueType {
                    name: Some(symbol.name.clone()),
                    ty,
                },
            });
            result.push(Operation::SetLocal {
                name: symbol.name,
                index: symbol.index,
            });
        }

        result
    }

    fn compile_assign(
        &mut self,
        assign: &AssignExpression,
        body: &mut FunctionBody,
        module: &mut Module,
    ) -> Vec<Operation> {
        let name = assign.target.to_string();

        let symbol = match self.symbol_table.resolve(&name) {
            Some(symbol) => symbol.clone(),
            None => {
                self.errors.push(CompilerError::UndefinedVariable(name));
                return vec![];
            }
        };

        let mut result = self.compile_expression(&assign.value, body, module);

        match symbol.scope {
            SymbolScope::Global => result.push(Operation::SetGlobal {
                name: symbol.name,
                index: symbol.index,
            }),
            SymbolScope::Local => result.push(Operation::SetLocal {
                name: symbol.name,
                index: symbol.index,
            }),
        }

        result
    }

    fn compile_if(
        &mut self,
        if_expr: &IfExpression,
        body: &mut FunctionBody,
        module: &mut Module,
    ) -> Vec<Operation> {
        let condition = self.compile_expression(&if_expr.condition, body, module);

        let mut then = vec![];
        for statement in &if_expr.body.statements {
            then.extend(self.compile_statement(statement, body, module));
        }

        vec![Operation::If { condition, then }]
    }

    /// Minimal inference: integer literals and calls with a declared result.
    fn infer_type(&self, expression: &Expression, module: &Module) -> Option<Type> {
        match expression {
            Expression::IntLit(_) => Some(Type::I32),
            Expression::Call(call) => {
                let func = module.func_type(&call.function.to_string())?;
                func.result_type.map(|result| result.ty)
            }
            _ => None,
        }
    }

    fn lookup_type(&mut self, name: &str) -> Type {
        Type::from_name(name).unwrap_or_else(|| {
            self.errors
                .push(CompilerError::UnknownType(name.to_string()));
            Type::I32
        })
    }

    fn enter_scope(&mut self) {
        let outer = mem::take(&mut self.symbol_table);
        self.symbol_table = SymbolTable::enclose(outer);
    }

    fn leave_scope(&mut self) {
        let table = mem::take(&mut self.symbol_table);
        self.symbol_table = table.pop().unwrap_or_default();
    }
}

fn is_exported(name: &str) -> bool {
    name == "main"
        || name
            .chars()
            .next()
            .map_or(false, |ch| ch.is_ascii_uppercase())
}

fn kind_name(expression: &Expression) -> &'static str {
    match expression {
        Expression::Identifier(_) => "identifier",
        Expression::IntLit(_) => "int",
        Expression::FloatLit(_) => "float",
        Expression::StringLit(_) => "string",
        Expression::Infix(_) => "infix",
        Expression::Call(_) => "call",
        Expression::InitAssign(_) => "init assign",
        Expression::Assign(_) => "assign",
        Expression::If(_) => "if",
        Expression::Grouped(_) => "grouped",
    }
}
