use std::{
    path::Path,
    sync::{mpsc, LazyLock, Mutex},
    thread,
};

use anyhow::Result;
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    {ContentLimit, FileRotate},
};
use log::Log;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

pub type LogSink = Box<dyn Fn(String) + Send>;

/// Platform side receiver of log lines, e.g. the native console.
static LOG_SINK: LazyLock<Mutex<Option<LogSink>>> = LazyLock::new(|| Mutex::new(None));

/// Sender of the dispatcher channel, set once by `init`.
static LOG_SENDER: LazyLock<Mutex<Option<mpsc::Sender<String>>>> =
    LazyLock::new(|| Mutex::new(None));

pub struct MainLogger {
    write_logger: Box<WriteLogger<FileRotate<AppendTimestamp>>>,
}

impl MainLogger {
    fn new(write_logger: Box<WriteLogger<FileRotate<AppendTimestamp>>>) -> Self {
        Self { write_logger }
    }
}

impl Log for MainLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.write_logger.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_logger.log(record);

        let message = format!(
            "{}:{} -- {}",
            record.level(),
            record.target(),
            record.args()
        );
        let sender = LOG_SENDER.lock().unwrap_or_else(|e| e.into_inner());
        match sender.as_ref() {
            // a closed channel only means nobody is listening any more
            Some(tx) => {
                let _ = tx.send(message);
            }
            None => eprintln!("{}", message),
        }
    }

    fn flush(&self) {
        self.write_logger.flush();
    }
}

pub fn init(cache_dir: &str) -> Result<()> {
    let path = Path::new(cache_dir).join("logs/main.log");
    let log = FileRotate::new(
        path,
        AppendTimestamp::default(FileLimit::MaxFiles(3)),
        ContentLimit::Lines(1000),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let write_logger = WriteLogger::new(LevelFilter::Info, config, log);
    log::set_boxed_logger(Box::new(MainLogger::new(write_logger)))?;
    log::set_max_level(LevelFilter::Info);

    init_dispatcher();
    Ok(())
}

// Forwarding happens on its own thread so a slow sink never blocks the
// thread that logged.
fn init_dispatcher() {
    let mut guard = LOG_SENDER.lock().unwrap_or_else(|e| e.into_inner());
    if guard.is_some() {
        return;
    }

    let (tx, rx) = mpsc::channel::<String>();
    *guard = Some(tx);

    thread::spawn(move || {
        while let Ok(message) = rx.recv() {
            let sink = LOG_SINK.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(sink) = sink.as_ref() {
                sink(message);
            }
        }
    });
}

pub fn set_log_sink(sink: LogSink) {
    let mut guard = LOG_SINK.lock().unwrap_or_else(|e| e.into_inner());
    *guard = Some(sink);
}
