use anyhow::{Result, anyhow};

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Host clipboard through arboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().map_err(|e| anyhow!("clipboard unavailable: {e}"))?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| anyhow!("clipboard write failed: {e}"))
    }
}

/// Process-local clipboard, used when no display server is reachable.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// System clipboard if available, otherwise an in-process one.
pub fn default_clipboard() -> Box<dyn Clipboard> {
    match SystemClipboard::new() {
        Ok(clipboard) => Box::new(clipboard),
        Err(e) => {
            log::warn!("{e}; falling back to in-process clipboard");
            Box::new(MemoryClipboard::default())
        }
    }
}
