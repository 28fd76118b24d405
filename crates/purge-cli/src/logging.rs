use std::fmt::Debug;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// A WARN or ERROR event rendered as a GitHub Actions workflow command, so
/// the runner shows it as an annotation on the job.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub level: Level,
    pub fields: Vec<(String, String)>,
}

impl Annotation {
    pub fn command(&self) -> Option<String> {
        let name = match self.level {
            Level::ERROR => "error",
            Level::WARN => "warning",
            _ => return None,
        };
        Some(format!("::{name}::{}", escape_data(&self.text())))
    }

    fn text(&self) -> String {
        let message = self
            .fields
            .iter()
            .find(|(name, _)| name == "message")
            .map(|(_, value)| value.as_str())
            .unwrap_or("");
        let extras: Vec<String> = self
            .fields
            .iter()
            .filter(|(name, _)| name != "message")
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        if extras.is_empty() {
            message.to_string()
        } else {
            format!("{message} ({})", extras.join(", "))
        }
    }
}

/// Escapes a workflow command payload so newlines and `%` survive the
/// runner's line-based parser.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

#[derive(Clone)]
pub struct WorkflowCommandLayer {
    writer: SharedWriter,
}

impl WorkflowCommandLayer {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }
}

impl<S> Layer<S> for WorkflowCommandLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level != Level::ERROR && level != Level::WARN {
            return;
        }
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let annotation = Annotation {
            level,
            fields: visitor.fields,
        };
        if let Some(line) = annotation.command()
            && let Ok(mut writer) = self.writer.lock()
        {
            let _ = writeln!(writer, "{line}");
            let _ = writer.flush();
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn push(&mut self, field: &tracing::field::Field, value: String) {
        self.fields.push((field.name().to_string(), value));
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.push(field, value.to_string());
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.push(field, value.to_string());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.push(field, value.to_string());
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn Debug) {
        self.push(field, format!("{value:?}"));
    }
}
