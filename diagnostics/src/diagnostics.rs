//! The diagnostics object controls the output of the errors and warnings a
//! type checking run produces. It also tracks how many of them were emitted
//! so callers can decide whether to go on.
//!
//! This implementation is NOT thread-safe.
use failure::AsFail;
use std::{cell::RefCell, collections::HashMap, io, rc::Rc};
use termcolor::{Buffer, Color, ColorSpec, NoColor, WriteColor};

/// Instead of writing errors directly to stderr, they are collected in this
/// object, which is the single place responsible for formatting them.
pub struct Diagnostics {
    message_count: RefCell<HashMap<MessageLevel, usize>>,
    writer: RefCell<Box<dyn WriteColor>>,
}

impl Diagnostics {
    pub fn new(writer: Box<dyn WriteColor>) -> Self {
        Self {
            writer: RefCell::new(writer),
            message_count: RefCell::new(HashMap::new()),
        }
    }

    /// True when an error message was emitted, false
    /// if only warnings were emitted.
    pub fn errored(&self) -> bool {
        self.count(MessageLevel::Error) > 0
    }

    pub fn count(&self, level: MessageLevel) -> usize {
        self.message_count
            .borrow()
            .get(&level)
            .cloned()
            .unwrap_or(0)
    }

    pub fn write_statistics(&self) {
        let mut writer = self.writer.borrow_mut();
        let mut output = ColorOutput::new(&mut **writer);
        output.set_bold(true);

        let summary = if self.errored() {
            output.set_color(MessageLevel::Error.color());
            format!(
                "Type checking aborted due to {}",
                match self.count(MessageLevel::Error) {
                    1 => "an error".to_string(),
                    n => format!("{} errors", n),
                }
            )
        } else {
            output.set_color(Some(Color::Green));
            format!(
                "Type checking finished successfully {}",
                match self.count(MessageLevel::Warning) {
                    0 => "without warnings".to_string(),
                    1 => "with a warning".to_string(),
                    n => format!("with {} warnings", n),
                }
            )
        };

        // the output is best effort, like the coloring
        writeln!(output.writer(), "{}", summary).ok();
    }

    /// Generate an error or a warning that is printed to the
    /// writer given in the `new` constructor. Most of the time
    /// this will be stderr.
    pub fn emit(&self, level: MessageLevel, kind: &dyn AsFail, help: Option<&str>) {
        let msg = Message { level, kind, help };

        let mut writer = self.writer.borrow_mut();
        msg.write_colored(&mut **writer).ok();
        self.increment_level_count(level);
    }

    pub fn warning(&self, kind: &dyn AsFail) {
        self.emit(MessageLevel::Warning, kind, None)
    }

    pub fn error(&self, kind: &dyn AsFail) {
        self.emit(MessageLevel::Error, kind, None)
    }

    pub fn error_with_help(&self, kind: &dyn AsFail, help: &str) {
        self.emit(MessageLevel::Error, kind, Some(help))
    }

    fn increment_level_count(&self, level: MessageLevel) {
        let mut message_count = self.message_count.borrow_mut();
        let counter = message_count.entry(level).or_insert(0);
        *counter += 1;
    }
}

// dummy_writer returns a WriteColor meant for use in tests.
pub fn dummy_writer() -> impl WriteColor {
    NoColor::new(io::sink())
}

/// Uncolored in-memory writer whose contents can still be read after a
/// clone of it was handed to `Diagnostics`. Meant for tests.
#[derive(Clone)]
pub struct CapturedOutput(Rc<RefCell<Buffer>>);

impl CapturedOutput {
    pub fn new() -> Self {
        CapturedOutput(Rc::new(RefCell::new(Buffer::no_color())))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(self.0.borrow().as_slice()).into_owned()
    }
}

impl Default for CapturedOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut *self.0.borrow_mut(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::Write::flush(&mut *self.0.borrow_mut())
    }
}

impl WriteColor for CapturedOutput {
    fn supports_color(&self) -> bool {
        false
    }

    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        self.0.borrow_mut().set_color(spec)
    }

    fn reset(&mut self) -> io::Result<()> {
        self.0.borrow_mut().reset()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MessageLevel {
    Error,
    Warning,
}

impl MessageLevel {
    fn color(self) -> Option<Color> {
        // Don't be confused by the return type. `None` means default color!
        match self {
            MessageLevel::Error => Some(Color::Red),
            MessageLevel::Warning => Some(Color::Yellow),
        }
    }

    fn name(self) -> &'static str {
        match self {
            MessageLevel::Error => "error",
            MessageLevel::Warning => "warning",
        }
    }
}

struct Message<'a> {
    level: MessageLevel,
    kind: &'a dyn AsFail,
    help: Option<&'a str>,
}

const HELP: Option<Color> = Some(Color::Cyan);

impl Message<'_> {
    fn write_colored(&self, writer: &mut dyn WriteColor) -> io::Result<()> {
        {
            let mut output = ColorOutput::new(writer);
            output.set_color(self.level.color());
            output.set_bold(true);
            write!(output.writer(), "{}: ", self.level.name())?;

            output.set_color(None);
            writeln!(output.writer(), "{}", self.kind.as_fail())?;
        }

        if let Some(help) = self.help {
            let mut output = ColorOutput::new(writer);
            output.set_color(HELP);
            output.set_bold(true);
            write!(output.writer(), "  = help: ")?;

            output.set_color(None);
            output.set_bold(false);
            writeln!(output.writer(), "{}", help)?;
        }

        Ok(())
    }
}

/// Helper for writing colors and font styles to the terminal.
///
/// Calls to functions should pass the raw writer, each function should
/// create its own `ColorOutput` object that is dropped on return. This
/// gurantees correct coloring in nested calls.
struct ColorOutput<'a> {
    writer: &'a mut dyn WriteColor,
    spec: ColorSpec,
}

impl<'a> ColorOutput<'a> {
    fn new(writer: &'a mut dyn WriteColor) -> Self {
        writer.reset().ok();

        Self {
            writer,
            spec: ColorSpec::new(),
        }
    }

    fn set_color(&mut self, color: Option<Color>) {
        // ignore coloring failures using ok()
        self.spec.set_fg(color);
        self.writer.set_color(&self.spec).ok();
    }

    fn set_bold(&mut self, yes: bool) {
        // ignore coloring failures using ok()
        self.spec.set_bold(yes);
        self.writer.set_color(&self.spec).ok();
    }

    fn writer(&mut self) -> &mut dyn WriteColor {
        self.writer
    }
}

/// reset to no color by default. Otherwise code that
/// is not color aware will print everything in the
/// color last used.
impl<'a> Drop for ColorOutput<'a> {
    fn drop(&mut self) {
        // ignore coloring failures using ok()
        self.writer.reset().ok();
    }
}
