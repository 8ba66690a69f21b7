//! x86-64 assembly emission.
//!
//! GNU-assembler syntax, AT&T operand order. Every variable and every
//! temporary owns one 8-byte stack slot: variables first (parameters
//! leading), temporaries after, with slot `i` at `-8*(i+1)(%rbp)`.
//! Values flow through `%rax`/`%rbx`; nothing is kept in a register
//! across instructions. Naive, but every instruction lowers locally
//! and the frame layout never needs fixups.

use anemo_ir::{InstrKind, IrFunction, IrProgram, LabelId, StrId, Temp};
use anemo_par::ast::{BinaryOp, Type, UnaryOp};
use anemo_util::Diagnostic;

use crate::abi::HostAbi;

/// Emits the whole program as one assembly translation unit.
pub fn emit_program(ir: &IrProgram) -> Result<String, Diagnostic> {
    let mut emitter = AsmEmitter::new();
    emitter.emit_rodata(ir);
    for f in &ir.functions {
        emitter.emit_function(f)?;
    }
    Ok(emitter.out)
}

/// The assembly symbol for a glyph. `main` keeps its name for the C
/// runtime; everything else is prefixed to stay clear of libc symbols.
fn symbol_for(name: &str) -> String {
    if name == "main" {
        name.to_string()
    } else {
        format!("anemo_{name}")
    }
}

/// Frame-pointer offset of stack slot `index`.
fn slot_offset(index: usize) -> i64 {
    -8 * (index as i64 + 1)
}

struct AsmEmitter {
    out: String,
}

impl AsmEmitter {
    fn new() -> Self {
        let mut out = String::new();
        out.push_str(".extern printf\n\n");
        Self { out }
    }

    /// One indented instruction line.
    fn ins(&mut self, text: &str) {
        self.out.push_str("  ");
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn label_line(&mut self, label: &str) {
        self.out.push_str(label);
        self.out.push_str(":\n");
    }

    fn emit_rodata(&mut self, ir: &IrProgram) {
        self.out.push_str(".section .rodata\n");
        self.out.push_str(".LC_fmt_int:\n  .string \"%ld\\n\"\n");
        self.out.push_str(".LC_fmt_str:\n  .string \"%s\\n\"\n");
        self.out.push_str(".LC_bool_yes:\n  .string \"yes\"\n");
        self.out.push_str(".LC_bool_no:\n  .string \"no\"\n");

        for (id, value) in ir.strings.iter() {
            self.out.push_str(&format!(".LC_str_{id}:\n  .string "));
            self.out.push_str(&escaped_cstr(value));
            self.out.push('\n');
        }
        self.out.push('\n');
    }

    fn emit_function(&mut self, f: &IrFunction) -> Result<(), Diagnostic> {
        let sym = symbol_for(&f.name);
        self.out.push_str(".text\n");
        self.out.push_str(&format!(".globl {sym}\n"));
        self.label_line(&sym);

        let slots = f.vars.len() + f.temp_count as usize;
        let mut frame = (slots * 8) as u32;
        if frame % 16 != 0 {
            frame += 8;
        }

        self.ins("pushq %rbp");
        self.ins("movq %rsp, %rbp");
        if frame > 0 {
            self.ins(&format!("subq ${frame}, %rsp"));
        }

        if f.param_count > HostAbi::MAX_CALL_ARGS {
            return Err(Diagnostic::fatal(format!(
                "codegen supports at most {} parameters on this target",
                HostAbi::MAX_CALL_ARGS
            )));
        }
        for i in 0..f.param_count {
            self.ins(&format!(
                "movq {}, {}(%rbp)",
                HostAbi::arg_register(i),
                slot_offset(i)
            ));
        }

        for instr in &f.code {
            self.emit_instr(f, &instr.kind)?;
        }

        self.label_line(&epilogue_label(&f.name));
        self.ins("leave");
        self.ins("ret");
        self.out.push('\n');
        Ok(())
    }

    fn emit_instr(&mut self, f: &IrFunction, kind: &InstrKind) -> Result<(), Diagnostic> {
        match kind {
            InstrKind::Label(id) => {
                let label = jump_label(&f.name, *id);
                self.label_line(&label);
            }
            InstrKind::Jump(id) => {
                self.ins(&format!("jmp {}", jump_label(&f.name, *id)));
            }
            InstrKind::JumpIfZero { cond, target } => {
                self.load_temp(f, *cond, "%rax");
                self.ins("cmpq $0, %rax");
                self.ins(&format!("je {}", jump_label(&f.name, *target)));
            }
            InstrKind::ConstInt { dst, value } => {
                self.ins(&format!("movq ${value}, %rax"));
                self.store_temp(f, *dst, "%rax");
            }
            InstrKind::ConstBool { dst, value } => {
                self.ins(&format!("movq ${}, %rax", i64::from(*value)));
                self.store_temp(f, *dst, "%rax");
            }
            InstrKind::ConstStr { dst, id } => {
                self.ins(&format!("leaq {}(%rip), %rax", string_label(*id)));
                self.store_temp(f, *dst, "%rax");
            }
            InstrKind::LoadVar { dst, var } => {
                self.ins(&format!("movq {}(%rbp), %rax", slot_offset(*var)));
                self.store_temp(f, *dst, "%rax");
            }
            InstrKind::StoreVar { var, src } => {
                self.load_temp(f, *src, "%rax");
                self.ins(&format!("movq %rax, {}(%rbp)", slot_offset(*var)));
            }
            InstrKind::Binary { dst, op, lhs, rhs } => {
                self.emit_binary(f, *dst, *op, *lhs, *rhs);
            }
            InstrKind::Unary { dst, op, src } => {
                self.load_temp(f, *src, "%rax");
                match op {
                    UnaryOp::Neg => self.ins("negq %rax"),
                    UnaryOp::Flip => {
                        self.ins("cmpq $0, %rax");
                        self.ins("sete %al");
                        self.ins("movzbq %al, %rax");
                    }
                }
                self.store_temp(f, *dst, "%rax");
            }
            InstrKind::Call { dst, name, args } => {
                if args.len() > HostAbi::MAX_CALL_ARGS {
                    return Err(Diagnostic::fatal(format!(
                        "codegen supports at most {} call arguments on this target",
                        HostAbi::MAX_CALL_ARGS
                    )));
                }
                for (i, arg) in args.iter().enumerate() {
                    self.load_temp(f, *arg, HostAbi::arg_register(i));
                }
                self.shadow_enter();
                self.ins(&format!("call {}", symbol_for(name)));
                self.shadow_leave();
                if let Some(dst) = dst {
                    self.store_temp(f, *dst, "%rax");
                }
            }
            InstrKind::Chant { src, ty } => {
                self.emit_chant(f, *src, *ty);
            }
            InstrKind::Return { value } => {
                match value {
                    Some(value) => self.load_temp(f, *value, "%rax"),
                    None => self.ins("movq $0, %rax"),
                }
                self.ins(&format!("jmp {}", epilogue_label(&f.name)));
            }
        }
        Ok(())
    }

    fn emit_binary(&mut self, f: &IrFunction, dst: Temp, op: BinaryOp, lhs: Temp, rhs: Temp) {
        self.load_temp(f, lhs, "%rax");
        self.load_temp(f, rhs, "%rbx");

        match op {
            BinaryOp::Add => self.ins("addq %rbx, %rax"),
            BinaryOp::Sub => self.ins("subq %rbx, %rax"),
            BinaryOp::Mul => self.ins("imulq %rbx, %rax"),
            BinaryOp::Div => {
                self.ins("cqto");
                self.ins("idivq %rbx");
            }
            BinaryOp::Both => {
                self.ins("andq %rbx, %rax");
                self.normalize_bool("setne");
            }
            BinaryOp::Either => {
                self.ins("orq %rbx, %rax");
                self.normalize_bool("setne");
            }
            BinaryOp::Same => self.compare("sete"),
            BinaryOp::Diff => self.compare("setne"),
            BinaryOp::Less => self.compare("setl"),
            BinaryOp::More => self.compare("setg"),
            BinaryOp::AtMost => self.compare("setle"),
            BinaryOp::AtLeast => self.compare("setge"),
        }

        self.store_temp(f, dst, "%rax");
    }

    fn compare(&mut self, set: &str) {
        self.ins("cmpq %rbx, %rax");
        self.ins(&format!("{set} %al"));
        self.ins("movzbq %al, %rax");
    }

    /// Collapses a bitwise result to a canonical 0/1.
    fn normalize_bool(&mut self, set: &str) {
        self.ins("cmpq $0, %rax");
        self.ins(&format!("{set} %al"));
        self.ins("movzbq %al, %rax");
    }

    fn emit_chant(&mut self, f: &IrFunction, src: Temp, ty: Type) {
        self.load_temp(f, src, "%rax");

        let fmt_reg = HostAbi::arg_register(0);
        let val_reg = HostAbi::arg_register(1);
        match ty {
            Type::Int => {
                self.ins(&format!("movq %rax, {val_reg}"));
                self.ins(&format!("leaq .LC_fmt_int(%rip), {fmt_reg}"));
            }
            Type::Text => {
                self.ins(&format!("movq %rax, {val_reg}"));
                self.ins(&format!("leaq .LC_fmt_str(%rip), {fmt_reg}"));
            }
            _ => {
                // Booleans print as "yes"/"no" through the %s format.
                let alt_reg = HostAbi::arg_register(2);
                self.ins("cmpq $0, %rax");
                self.ins(&format!("leaq .LC_bool_no(%rip), {val_reg}"));
                self.ins(&format!("leaq .LC_bool_yes(%rip), {alt_reg}"));
                self.ins(&format!("cmovne {alt_reg}, {val_reg}"));
                self.ins(&format!("leaq .LC_fmt_str(%rip), {fmt_reg}"));
            }
        }

        self.ins("xor %eax, %eax");
        self.shadow_enter();
        self.ins(&format!("call {}", HostAbi::PRINTF));
        self.shadow_leave();
    }

    fn shadow_enter(&mut self) {
        if HostAbi::SHADOW_SPACE > 0 {
            self.ins(&format!("subq ${}, %rsp", HostAbi::SHADOW_SPACE));
        }
    }

    fn shadow_leave(&mut self) {
        if HostAbi::SHADOW_SPACE > 0 {
            self.ins(&format!("addq ${}, %rsp", HostAbi::SHADOW_SPACE));
        }
    }

    fn load_temp(&mut self, f: &IrFunction, temp: Temp, reg: &str) {
        let off = slot_offset(f.vars.len() + temp as usize);
        self.ins(&format!("movq {off}(%rbp), {reg}"));
    }

    fn store_temp(&mut self, f: &IrFunction, temp: Temp, reg: &str) {
        let off = slot_offset(f.vars.len() + temp as usize);
        self.ins(&format!("movq {reg}, {off}(%rbp)"));
    }
}

fn jump_label(fn_name: &str, id: LabelId) -> String {
    format!(".L_{fn_name}_{id}")
}

fn epilogue_label(fn_name: &str) -> String {
    format!(".L_{fn_name}_epilogue")
}

fn string_label(id: StrId) -> String {
    format!(".LC_str_{id}")
}

/// Renders string contents as a double-quoted `.string` operand. Bytes
/// outside printable ASCII come out as `\xHH`.
fn escaped_cstr(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for b in s.bytes() {
        match b {
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\r' => out.push_str("\\r"),
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anemo_ir::lower_program;

    fn emit(src: &str) -> String {
        let tokens = anemo_lex::lex_source("test.anm", src).unwrap();
        let mut program = anemo_par::parse_program("test.anm", &tokens).unwrap();
        anemo_sem::check_program("test.anm", &mut program).unwrap();
        let ir = lower_program(&program).unwrap();
        emit_program(&ir).unwrap()
    }

    const MAIN_RET0: &str = "glyph main[] yields ember\noffer 0\nseal\n";

    #[test]
    fn test_escaped_cstr() {
        assert_eq!(escaped_cstr("hi"), "\"hi\"");
        assert_eq!(escaped_cstr("a\nb\tc"), "\"a\\nb\\tc\"");
        assert_eq!(escaped_cstr("say \"x\\y\""), "\"say \\\"x\\\\y\\\"\"");
        assert_eq!(escaped_cstr("\u{1}"), "\"\\x01\"");
        assert_eq!(escaped_cstr("é"), "\"\\xc3\\xa9\"");
    }

    #[test]
    fn test_symbol_naming() {
        assert_eq!(symbol_for("main"), "main");
        assert_eq!(symbol_for("fact"), "anemo_fact");
    }

    #[test]
    fn test_slot_offsets() {
        assert_eq!(slot_offset(0), -8);
        assert_eq!(slot_offset(1), -16);
        assert_eq!(slot_offset(5), -48);
    }

    #[test]
    fn test_header_and_rodata() {
        let asm = emit(MAIN_RET0);
        assert!(asm.starts_with(".extern printf\n"));
        assert!(asm.contains(".section .rodata"));
        assert!(asm.contains(".LC_fmt_int:\n  .string \"%ld\\n\""));
        assert!(asm.contains(".LC_fmt_str:\n  .string \"%s\\n\""));
        assert!(asm.contains(".LC_bool_yes:\n  .string \"yes\""));
        assert!(asm.contains(".LC_bool_no:\n  .string \"no\""));
    }

    #[test]
    fn test_string_literals_land_in_rodata() {
        let asm = emit("glyph main[] yields ember\nchant \"hi\\n\"\noffer 0\nseal\n");
        assert!(asm.contains(".LC_str_0:\n  .string \"hi\\n\""));
        assert!(asm.contains("leaq .LC_str_0(%rip), %rax"));
    }

    #[test]
    fn test_prologue_and_epilogue() {
        let asm = emit(MAIN_RET0);
        assert!(asm.contains(".globl main\nmain:\n"));
        assert!(asm.contains("pushq %rbp"));
        assert!(asm.contains("movq %rsp, %rbp"));
        assert!(asm.contains(".L_main_epilogue:\n  leave\n  ret\n"));
    }

    #[test]
    fn test_frame_size_is_16_byte_aligned() {
        // One temporary: 8 bytes of slots, rounded up to 16.
        let asm = emit(MAIN_RET0);
        assert!(asm.contains("subq $16, %rsp"));

        // One variable + two temporaries: 24 bytes, rounded up to 32.
        let asm = emit("glyph main[] yields ember\nbind x = 1\noffer x\nseal\n");
        assert!(asm.contains("subq $32, %rsp"));
    }

    #[test]
    fn test_division_sign_extends() {
        let asm = emit("glyph main[] yields ember\noffer 7 / 2\nseal\n");
        assert!(asm.contains("cqto\n  idivq %rbx"));
    }

    #[test]
    fn test_comparison_materializes_a_flag() {
        let asm = emit("glyph main[] yields ember\nbind b = 1 less 2\noffer 0\nseal\n");
        assert!(asm.contains("cmpq %rbx, %rax\n  setl %al\n  movzbq %al, %rax"));
    }

    #[test]
    fn test_logical_and_normalizes_to_zero_or_one() {
        let asm = emit("glyph main[] yields ember\nbind b = yes both no\noffer 0\nseal\n");
        assert!(asm.contains("andq %rbx, %rax\n  cmpq $0, %rax\n  setne %al"));
    }

    #[test]
    fn test_branch_compares_against_zero() {
        let asm = emit("glyph main[] yields ember\nfork yes\nchant 1\nseal\noffer 0\nseal\n");
        assert!(asm.contains("cmpq $0, %rax\n  je .L_main_0"));
        assert!(asm.contains("jmp .L_main_1"));
        assert!(asm.contains(".L_main_0:\n"));
        assert!(asm.contains(".L_main_1:\n"));
    }

    #[test]
    fn test_calls_use_mangled_symbols() {
        let src = "glyph helper[] yields ember\noffer 5\nseal\n\
                   glyph main[] yields ember\noffer invoke helper\nseal\n";
        let asm = emit(src);
        assert!(asm.contains(".globl anemo_helper\nanemo_helper:\n"));
        assert!(asm.contains("call anemo_helper"));
        assert!(!asm.contains("call helper"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_parameters_move_from_argument_registers() {
        let src = "glyph f[a: ember, b: ember] yields ember\noffer a + b\nseal\n\
                   glyph main[] yields ember\noffer invoke f with 1, 2\nseal\n";
        let asm = emit(src);
        assert!(asm.contains("movq %rdi, -8(%rbp)"));
        assert!(asm.contains("movq %rsi, -16(%rbp)"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_chant_int_uses_the_printf_plt_symbol() {
        let asm = emit("glyph main[] yields ember\nchant 42\noffer 0\nseal\n");
        assert!(asm.contains("movq %rax, %rsi"));
        assert!(asm.contains("leaq .LC_fmt_int(%rip), %rdi"));
        assert!(asm.contains("xor %eax, %eax"));
        assert!(asm.contains("call printf@PLT"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_chant_bool_selects_yes_or_no() {
        let asm = emit("glyph main[] yields ember\nchant yes\noffer 0\nseal\n");
        assert!(asm.contains("leaq .LC_bool_no(%rip), %rsi"));
        assert!(asm.contains("leaq .LC_bool_yes(%rip), %rdx"));
        assert!(asm.contains("cmovne %rdx, %rsi"));
        assert!(asm.contains("leaq .LC_fmt_str(%rip), %rdi"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_no_shadow_space_on_system_v() {
        let src = "glyph helper[] yields ember\noffer 5\nseal\n\
                   glyph main[] yields ember\nchant invoke helper\noffer 0\nseal\n";
        let asm = emit(src);
        assert!(!asm.contains("subq $32, %rsp\n  call"));
    }

    #[test]
    fn test_mist_return_zeroes_rax() {
        let src = "glyph quiet[] yields mist\nchant 1\nseal\n\
                   glyph main[] yields ember\noffer 0\nseal\n";
        let asm = emit(src);
        assert!(asm.contains("movq $0, %rax\n  jmp .L_quiet_epilogue"));
    }

    #[test]
    fn test_emission_is_deterministic() {
        let src = "glyph fact[n: ember] yields ember\n\
                   fork n atmost 1\n\
                   offer 1\n\
                   seal\n\
                   offer n * invoke fact with n - 1\n\
                   seal\n\
                   glyph main[] yields ember\nchant invoke fact with 5\noffer 0\nseal\n";
        assert_eq!(emit(src), emit(src));
    }

    #[test]
    fn test_functions_emit_in_source_order() {
        let src = "glyph b[] yields mist\noffer\nseal\n\
                   glyph a[] yields mist\noffer\nseal\n\
                   glyph main[] yields ember\noffer 0\nseal\n";
        let asm = emit(src);
        let b_pos = asm.find("anemo_b:").unwrap();
        let a_pos = asm.find("anemo_a:").unwrap();
        let main_pos = asm.find("main:").unwrap();
        assert!(b_pos < a_pos && a_pos < main_pos);
    }
}
