// Output sinks shared by a logger's writer

use crate::config::BuildError;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
pub enum Sink {
    Stdout,
    Stderr,
    File(Arc<Mutex<File>>),
    Writer(Arc<Mutex<Box<dyn Write + Send>>>),
}

impl Sink {
    /// `stdout` and `stderr` are the standard streams; anything else is a file path.
    pub fn open(path: &str) -> Result<Sink, BuildError> {
        match path {
            "stdout" => Ok(Sink::Stdout),
            "stderr" => Ok(Sink::Stderr),
            _ => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| BuildError::OpenSink {
                        path: path.to_string(),
                        source,
                    })?;
                Ok(Sink::File(Arc::new(Mutex::new(file))))
            }
        }
    }

    pub fn writer<W>(writer: W) -> Sink
    where
        W: Write + Send + 'static,
    {
        Sink::Writer(Arc::new(Mutex::new(Box::new(writer))))
    }

    fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        match self {
            Sink::Stdout => io::stdout().lock().write_all(buf),
            Sink::Stderr => io::stderr().lock().write_all(buf),
            Sink::File(file) => file
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write_all(buf),
            Sink::Writer(writer) => writer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write_all(buf),
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self {
            Sink::Stdout => io::stdout().flush(),
            Sink::Stderr => io::stderr().flush(),
            Sink::File(file) => file.lock().unwrap_or_else(PoisonError::into_inner).flush(),
            Sink::Writer(writer) => writer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .flush(),
        }
    }
}

/// Every entry is written to each sink in turn.
#[derive(Clone)]
pub struct Sinks(Arc<[Sink]>);

impl Sinks {
    pub fn new(sinks: Vec<Sink>) -> Self {
        Sinks(sinks.into())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.0.iter().try_for_each(Sink::flush)
    }
}

pub struct SinksWriter<'a>(&'a [Sink]);

impl Write for SinksWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in self.0 {
            sink.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.iter().try_for_each(Sink::flush)
    }
}

impl<'a> MakeWriter<'a> for Sinks {
    type Writer = SinksWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinksWriter(&self.0)
    }
}
