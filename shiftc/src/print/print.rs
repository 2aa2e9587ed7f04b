use crate::lexer::token::Position;

/// Renders positioned diagnostics against the original source: the offending
/// line, a caret under the offending column, then the message.
pub struct Printer {
    lines: Vec<String>,
}

impl Printer {
    pub fn new(source: &str) -> Self {
        Self {
            lines: source.lines().map(|line| line.to_string()).collect(),
        }
    }

    pub fn print_error(&self, pos: Position, message: &str) -> String {
        let line_number = pos.line.to_string();

        let mut out = String::new();
        out.push('\n');
        out.push('[');
        out.push_str(&line_number);
        out.push_str("]  ");
        out.push_str(self.line(pos.line));
        out.push('\n');
        for _ in 0..(pos.column as usize + line_number.len() + 3) {
            out.push(' ');
        }
        out.push_str("^\n");
        out.push_str(message);

        out
    }

    pub fn line(&self, line: u32) -> &str {
        self.lines
            .get((line - 1) as usize)
            .map(String::as_str)
            .unwrap_or("")
    }
}
