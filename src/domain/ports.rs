use crate::domain::model::{MarkerPolicy, Markers, WriteMode};
use crate::utils::error::Result;
use std::io::BufRead;
use std::path::Path;

pub trait ConfigProvider {
    fn config_path(&self) -> &Path;
    fn service(&self) -> &str;
    fn port(&self) -> Result<u16>;
    fn markers(&self) -> Markers;
    fn write_mode(&self) -> WriteMode;
    fn marker_policy(&self) -> MarkerPolicy;
}

/// A file held open for one read pass followed by one write pass.
pub trait Storage {
    fn path(&self) -> &Path;
    fn reader(&mut self) -> Result<Box<dyn BufRead + '_>>;
    fn replace(&mut self, content: &[u8]) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn path(&self) -> &Path {
        (**self).path()
    }

    fn reader(&mut self) -> Result<Box<dyn BufRead + '_>> {
        (**self).reader()
    }

    fn replace(&mut self, content: &[u8]) -> Result<()> {
        (**self).replace(content)
    }
}
