//! Nested coordinate transforms for streaming documents.
//!
//! Grouping elements push a `matrix(a,b,c,d,e,f)` on open and pop it on close. Only the
//! translation part (`e`, `f`) of the active transforms is applied when resolving a point;
//! the linear part is parsed and kept but not applied.

use crate::error::{Error, Result};

/// One parsed `matrix(a,b,c,d,e,f)` transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformRecord {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl TransformRecord {
    /// Parses exactly `matrix(a,b,c,d,e,f)`: six comma separated finite numbers.
    pub fn parse(raw: &str) -> Result<Self> {
        let malformed = || Error::MalformedTransform {
            raw: raw.to_string(),
        };

        let body = raw
            .trim()
            .strip_prefix("matrix(")
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let mut values = [0.0f64; 6];
        let mut count = 0usize;
        for token in body.split(',') {
            if count == values.len() {
                return Err(malformed());
            }
            let v = token.trim().parse::<f64>().map_err(|_| malformed())?;
            if !v.is_finite() {
                return Err(malformed());
            }
            values[count] = v;
            count += 1;
        }
        if count != values.len() {
            return Err(malformed());
        }

        let [a, b, c, d, e, f] = values;
        Ok(Self { a, b, c, d, e, f })
    }
}

/// The stack of transforms active at the current stream position.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    stack: Vec<TransformRecord>,
    offset_x: f64,
    offset_y: f64,
    dirty: bool,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, raw: &str) -> Result<()> {
        let record = TransformRecord::parse(raw)?;
        tracing::trace!(depth = self.stack.len() + 1, transform = raw, "push transform");
        self.stack.push(record);
        self.dirty = true;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<TransformRecord> {
        let record = self.stack.pop().ok_or(Error::UnbalancedTransformStack)?;
        tracing::trace!(depth = self.stack.len(), "pop transform");
        self.dirty = true;
        Ok(record)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.dirty = false;
    }

    /// Resolves `(x, y)` against the summed translations, returning `(x + Σe, y - Σf, 0)`.
    ///
    /// `y` is expected in flipped (map) space, hence the subtraction.
    pub fn resolve(&mut self, x: f64, y: f64) -> (f64, f64, f64) {
        if self.dirty {
            let (mut dx, mut dy) = (0.0, 0.0);
            for t in &self.stack {
                dx += t.e;
                dy += t.f;
            }
            self.offset_x = dx;
            self.offset_y = dy;
            self.dirty = false;
        }
        (x + self.offset_x, y - self.offset_y, 0.0)
    }
}
