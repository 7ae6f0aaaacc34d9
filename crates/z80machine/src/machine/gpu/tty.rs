/// Fixed character grid written by the TTY command.
#[derive(Clone, Debug)]
pub struct TtyBuffer {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
    cursor: usize,
    dirty: bool,
}

impl TtyBuffer {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![b' '; rows * cols],
            cursor: 0,
            dirty: false,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Cursor as (row, column).
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor / self.cols, self.cursor % self.cols)
    }

    /// Copy bytes from `text` at the cursor until a NUL, the end of `text`
    /// or a full grid's worth of characters, wrapping to the top-left
    /// cell. Returns the number of characters written.
    pub fn write(&mut self, text: &[u8]) -> usize {
        let capacity = self.capacity();
        let mut written = 0;
        for &byte in text.iter().take_while(|&&b| b != 0).take(capacity) {
            if self.cursor >= capacity {
                self.cursor = 0;
            }
            self.cells[self.cursor] = byte;
            self.cursor += 1;
            written += 1;
        }
        if self.cursor >= capacity {
            self.cursor = 0;
        }
        self.dirty = true;
        written
    }

    /// Grid contents, one line per row.
    pub fn text(&self) -> String {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|&b| char::from(b)).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn take_dirty(&mut self) -> Option<String> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.text())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_stops_at_nul_and_advances_cursor() {
        let mut tty = TtyBuffer::new(2, 4);
        assert_eq!((tty.rows(), tty.cols()), (2, 4));
        assert_eq!(tty.capacity(), 8);
        assert_eq!(tty.write(b"HELLO\0XY"), 5);
        assert_eq!(tty.cursor(), (1, 1));
        assert_eq!(tty.take_dirty().as_deref(), Some("HELL\nO   "));
        assert_eq!(tty.take_dirty(), None);
    }

    #[test]
    fn write_wraps_and_is_bounded_by_capacity() {
        let mut tty = TtyBuffer::new(1, 4);
        tty.write(b"AB");
        assert_eq!(tty.write(b"123456789"), 4);
        assert_eq!(tty.text(), "3412");
        assert_eq!(tty.cursor(), (0, 2));
    }
}
