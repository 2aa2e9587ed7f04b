pub mod codegen;
pub mod emitter;
pub mod module;
pub mod symbol_table;
