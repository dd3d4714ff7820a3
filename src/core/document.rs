/// Package clause every generated file starts with.
pub const OUTPUT_PACKAGE: &str = "functypes";

/// The generated Go file: header, blank line, one declaration per line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputDocument {
    declarations: Vec<String>,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, declaration: String) {
        self.declarations.push(declaration);
    }

    pub fn declarations(&self) -> &[String] {
        &self.declarations
    }

    pub fn render(&self) -> String {
        let mut out = format!("package {}\n\n", OUTPUT_PACKAGE);
        for declaration in &self.declarations {
            out.push_str(declaration);
            out.push('\n');
        }
        out
    }
}
