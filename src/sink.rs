use crate::errors::*;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where response bodies are written to.
pub enum Sink {
    Stdout(io::Stdout),
    /// A file we created and therefore close.
    File { path: PathBuf, file: File },
    /// A writer owned by the caller, it's flushed but never closed by us.
    Writer(Box<dyn Write + Send>),
}

impl Sink {
    pub fn stdout() -> Sink {
        Sink::Stdout(io::stdout())
    }

    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Sink> {
        let path = path.as_ref();
        let file = File::create(path)?;
        Ok(Sink::File {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Sink::File { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Flush and release the sink. Files are synced to disk before they're
    /// closed.
    pub fn close(mut self) -> Result<()> {
        self.flush()
            .map_err(|err| format_err!("flushing output: {}", err))?;
        if let Sink::File { path, file } = self {
            file.sync_all()
                .map_err(|err| format_err!("closing {:?}: {}", path, err))?;
            debug!("closed output file {:?}", path);
        }
        Ok(())
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout(w) => w.write(buf),
            Sink::File { file, .. } => file.write(buf),
            Sink::Writer(w) => w.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Sink::Stdout(w) => w.lock().write_all(buf),
            Sink::File { file, .. } => file.write_all(buf),
            Sink::Writer(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout(w) => w.flush(),
            Sink::File { file, .. } => file.flush(),
            Sink::Writer(w) => w.flush(),
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sink::Stdout(_) => write!(w, "Stdout"),
            Sink::File { path, .. } => write!(w, "File({:?})", path),
            Sink::Writer(_) => write!(w, "Writer"),
        }
    }
}

impl Default for Sink {
    fn default() -> Sink {
        Sink::stdout()
    }
}
