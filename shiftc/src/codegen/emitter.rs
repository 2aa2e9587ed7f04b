use super::module::{
    DataSegment, ExportEntry, FuncSig, FunctionBody, ImportEntry, MemoryType, Module, Operation,
    CONST_I32, EXT_KIND_FUNC, FUNC_FORM, GET_LOCAL, I32_ADD, I32_MUL, I32_NE, I32_SUB, OP_CALL,
    OP_END, OP_IF, SECTION_CODE, SECTION_DATA, SECTION_EXPORT, SECTION_FUNC, SECTION_IMPORT,
    SECTION_MEMORY, SECTION_TYPE, SET_GLOBAL, SET_LOCAL, TYPE_EMPTY_BLOCK, TYPE_F32, TYPE_F64,
    TYPE_I32, TYPE_I64, WASM_MAGIC, WASM_VERSION_1,
};
use crate::types::types::Type;

/// An open size-prefixed region: where the size will be written and how many
/// bytes have been emitted into it so far.
#[derive(Debug, Clone, Copy)]
struct Frame {
    pos: usize,
    size: usize,
}

/// Serializes a [`Module`] into the Wasm 1.0 binary format.
///
/// Section body sizes are not known up front, so the emitter keeps a stack of
/// open frames: every emitted byte is credited to each open frame, and
/// closing a frame splices the LEB128-encoded size back at its start.
/// Function bodies are framed exactly like sections, nested inside the code
/// section.
#[derive(Debug, Default)]
pub struct Emitter {
    buf: Vec<u8>,
    frames: Vec<Frame>,
}

fn type_code(ty: Type) -> u8 {
    match ty {
        Type::I32 => TYPE_I32,
        Type::I64 => TYPE_I64,
        Type::F32 => TYPE_F32,
        Type::F64 => TYPE_F64,
        // Lowering expands string params and rejects string results, so no
        // string ever reaches the wire.
        Type::String => TYPE_I32,
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Writes the whole module. Sections appear in the fixed wire order and
    /// only when they have entries.
    pub fn emit_module(&mut self, module: &Module) {
        self.emit(&WASM_MAGIC);
        self.emit(&WASM_VERSION_1);

        if !module.types.is_empty() {
            self.emit_type_section(&module.types);
        }
        if !module.imports.is_empty() {
            self.emit_import_section(&module.imports);
        }
        if !module.functions.is_empty() {
            self.emit_function_section(module);
        }
        if let Some(memory) = module.memory {
            self.emit_memory_section(memory);
        }
        if !module.exports.is_empty() {
            self.emit_export_section(&module.exports);
        }
        if !module.bodies.is_empty() {
            self.emit_code_section(&module.bodies);
        }
        if !module.data.is_empty() {
            self.emit_data_section(&module.data);
        }
    }

    fn emit_type_section(&mut self, types: &[FuncSig]) {
        self.emit(&[SECTION_TYPE]);
        self.start_section();

        self.emit_u32(types.len() as u32);
        for sig in types {
            self.emit(&[FUNC_FORM]);
            self.emit_u32(sig.params.len() as u32);
            for ty in &sig.params {
                self.emit(&[type_code(*ty)]);
            }
            match sig.result {
                Some(ty) => {
                    self.emit_u32(1);
                    self.emit(&[type_code(ty)]);
                }
                None => self.emit_u32(0),
            }
        }

        self.end_section();
    }

    fn emit_import_section(&mut self, imports: &[ImportEntry]) {
        self.emit(&[SECTION_IMPORT]);
        self.start_section();

        self.emit_u32(imports.len() as u32);
        for import in imports {
            self.emit_name(&import.module_name);
            self.emit_name(&import.field_name);
            self.emit(&[EXT_KIND_FUNC]);
            self.emit_u32(import.func_type.type_index);
        }

        self.end_section();
    }

    fn emit_function_section(&mut self, module: &Module) {
        self.emit(&[SECTION_FUNC]);
        self.start_section();

        self.emit_u32(module.functions.len() as u32);
        for func in &module.functions {
            self.emit_u32(func.type_index);
        }

        self.end_section();
    }

    fn emit_memory_section(&mut self, memory: MemoryType) {
        self.emit(&[SECTION_MEMORY]);
        self.start_section();

        self.emit_u32(1);
        self.emit_u32(memory.flags);
        self.emit_u32(memory.initial);
        if let Some(maximum) = memory.maximum {
            self.emit_u32(maximum);
        }

        self.end_section();
    }

    fn emit_export_section(&mut self, exports: &[ExportEntry]) {
        self.emit(&[SECTION_EXPORT]);
        self.start_section();

        self.emit_u32(exports.len() as u32);
        for export in exports {
            self.emit_name(&export.field);
            self.emit(&[EXT_KIND_FUNC]);
            self.emit_u32(export.index);
        }

        self.end_section();
    }

    fn emit_code_section(&mut self, bodies: &[FunctionBody]) {
        self.emit(&[SECTION_CODE]);
        self.start_section();

        self.emit_u32(bodies.len() as u32);
        for body in bodies {
            self.emit_function_body(body);
        }

        self.end_section();
    }

    fn emit_function_body(&mut self, body: &FunctionBody) {
        self.start_section();

        self.emit_u32(body.locals.len() as u32);
        for local in &body.locals {
            self.emit_u32(local.count);
            self.emit(&[type_code(local.value_type.ty)]);
        }

        for operation in &body.code {
            self.emit_operation(operation);
        }
        self.emit(&[OP_END]);

        self.end_section();
    }

    fn emit_data_section(&mut self, data: &[DataSegment]) {
        self.emit(&[SECTION_DATA]);
        self.start_section();

        self.emit_u32(data.len() as u32);
        for segment in data {
            // memory index, then the offset init expression
            self.emit_u32(0);
            self.emit(&[CONST_I32]);
            self.emit_i32(segment.offset);
            self.emit(&[OP_END]);

            self.emit_u32(segment.size);
            self.emit(&segment.bytes);
        }

        self.end_section();
    }

    fn emit_operation(&mut self, operation: &Operation) {
        match operation {
            Operation::ConstI32 { value } => {
                self.emit(&[CONST_I32]);
                self.emit_i32(*value);
            }
            Operation::GetLocal { index, .. } => {
                self.emit(&[GET_LOCAL]);
                self.emit_u32(*index);
            }
            Operation::SetLocal { index, .. } => {
                self.emit(&[SET_LOCAL]);
                self.emit_u32(*index);
            }
            Operation::SetGlobal { index, .. } => {
                self.emit(&[SET_GLOBAL]);
                self.emit_u32(*index);
            }
            Operation::Add => self.emit(&[I32_ADD]),
            Operation::Sub => self.emit(&[I32_SUB]),
            Operation::Mul => self.emit(&[I32_MUL]),
            Operation::NotEq => self.emit(&[I32_NE]),
            Operation::Call {
                function_index,
                args,
                ..
            } => {
                for arg in args {
                    self.emit_operation(arg);
                }
                self.emit(&[OP_CALL]);
                self.emit_u32(*function_index);
            }
            Operation::If { condition, then } => {
                for op in condition {
                    self.emit_operation(op);
                }
                self.emit(&[OP_IF, TYPE_EMPTY_BLOCK]);
                for op in then {
                    self.emit_operation(op);
                }
                self.emit(&[OP_END]);
            }
        }
    }

    fn emit_name(&mut self, name: &str) {
        self.emit_u32(name.len() as u32);
        self.emit(name.as_bytes());
    }

    fn emit(&mut self, bytes: &[u8]) {
        for frame in &mut self.frames {
            frame.size += bytes.len();
        }
        self.buf.extend_from_slice(bytes);
    }

    fn emit_u32(&mut self, value: u32) {
        let mut encoded = vec![];
        leb128::write::unsigned(&mut encoded, value as u64).unwrap();
        self.emit(&encoded);
    }

    fn emit_i32(&mut self, value: i32) {
        let mut encoded = vec![];
        leb128::write::signed(&mut encoded, value as i64).unwrap();
        self.emit(&encoded);
    }

    fn start_section(&mut self) {
        self.frames.push(Frame {
            pos: self.buf.len(),
            size: 0,
        });
    }

    /// Closes the innermost frame: its size is spliced in at the recorded
    /// position, and the inserted bytes count toward every frame still open.
    fn end_section(&mut self) {
        let frame = self.frames.pop().expect("unbalanced section frame");

        let mut encoded = vec![];
        leb128::write::unsigned(&mut encoded, frame.size as u64).unwrap();

        for open in &mut self.frames {
            open.size += encoded.len();
        }
        self.buf.splice(frame.pos..frame.pos, encoded);
    }
}
