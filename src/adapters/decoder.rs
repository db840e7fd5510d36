use crate::domain::ports::{Frame, QrDecoder};

/// Frame-local QR detection backed by `rqrr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn decode(&self, frame: &Frame) -> Option<String> {
        if frame.width == 0 || frame.height == 0 {
            return None;
        }

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            frame.width as usize,
            frame.height as usize,
            |x, y| frame.pixel(x, y),
        );

        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_, content)) if !content.is_empty() => return Some(content),
                Ok(_) => {}
                Err(e) => tracing::debug!("QR grid found but not decodable: {:?}", e),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_frame_has_no_code() {
        let frame = Frame {
            width: 64,
            height: 64,
            luma: vec![255; 64 * 64],
        };
        assert_eq!(RqrrDecoder.decode(&frame), None);
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame {
            width: 0,
            height: 0,
            luma: vec![],
        };
        assert_eq!(RqrrDecoder.decode(&frame), None);
    }
}
