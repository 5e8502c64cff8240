use crate::error::{Error, Result};

/// System clipboard handle, kept alive for the life of the app. On X11 the
/// selection dies with its owning connection, so a per-copy handle would
/// lose the text as soon as it was dropped.
#[derive(Default)]
pub struct Clipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `text` to the system clipboard, untransformed. The connection is
    /// opened lazily on first use and dropped on failure so the next copy
    /// reconnects.
    pub fn copy(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            let conn =
                arboard::Clipboard::new().map_err(|err| Error::clipboard(err.to_string()))?;
            self.inner = Some(conn);
        }
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| Error::clipboard("clipboard unavailable"))?;
        if let Err(err) = clipboard.set_text(text) {
            self.inner = None;
            return Err(Error::clipboard(err.to_string()));
        }
        Ok(())
    }
}
