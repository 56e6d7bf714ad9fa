use std::path::PathBuf;

use crate::error::DatasetError;

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// Number of digit classes.
pub const N_CLASSES: usize = 10;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Square grayscale images with raw `u8` intensities plus one class per image.
///
/// `pixels` is row-major, `rows * cols` bytes per image, images back to back.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledImages {
    pub rows: usize,
    pub cols: usize,
    pub pixels: Vec<u8>,
    pub labels: Vec<u8>,
}

impl LabeledImages {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Raw pixels of image `index`.
    pub fn image(&self, index: usize) -> &[u8] {
        let n = self.rows * self.cols;
        &self.pixels[index * n..(index + 1) * n]
    }
}

/// Images scaled to [0, 1], same layout as [`LabeledImages::pixels`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImages {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f32>,
}

impl NormalizedImages {
    pub fn len(&self) -> usize {
        match self.rows * self.cols {
            0 => 0,
            n => self.values.len() / n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn image(&self, index: usize) -> &[f32] {
        let n = self.rows * self.cols;
        &self.values[index * n..(index + 1) * n]
    }
}

/// Divides every intensity by 255.
pub fn normalize(images: &LabeledImages) -> NormalizedImages {
    NormalizedImages {
        rows: images.rows,
        cols: images.cols,
        values: images.pixels.iter().map(|&px| f32::from(px) / 255.0).collect(),
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Source of a `(train, test)` split.
pub trait DatasetProvider {
    fn load(&self) -> Result<(LabeledImages, LabeledImages), DatasetError>;
}

/// The four MNIST IDX files in one directory.
#[derive(Debug, Clone)]
pub struct IdxDirectory {
    pub dir: PathBuf,
}

impl IdxDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        IdxDirectory { dir: dir.into() }
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, DatasetError> {
        let path = self.dir.join(name);
        std::fs::read(&path).map_err(|source| DatasetError::Io { path, source })
    }

    fn load_pair(&self, images: &str, labels: &str) -> Result<LabeledImages, DatasetError> {
        parse_idx_pair(&self.read(images)?, &self.read(labels)?, N_CLASSES)
    }
}

impl DatasetProvider for IdxDirectory {
    fn load(&self) -> Result<(LabeledImages, LabeledImages), DatasetError> {
        let train = self.load_pair(TRAIN_IMAGES, TRAIN_LABELS)?;
        let test = self.load_pair(TEST_IMAGES, TEST_LABELS)?;
        Ok((train, test))
    }
}

// ---------------------------------------------------------------------------
// IDX parsing
// ---------------------------------------------------------------------------

/// Parses an IDX3 image file and its IDX1 label file.
///
/// # IDX3 image file layout
/// ```text
/// bytes  0-1:   0x00 0x00   (reserved, must be zero)
/// byte   2:     0x08        (dtype = uint8)
/// byte   3:     0x03        (number of dimensions = 3)
/// bytes  4-7:   N           (number of images, big-endian u32)
/// bytes  8-11:  rows        (big-endian u32)
/// bytes 12-15:  cols        (big-endian u32)
/// bytes 16..:   N * rows * cols bytes, row-major, uint8
/// ```
///
/// # IDX1 label file layout
/// ```text
/// bytes  0-3:   0x00 0x00 0x08 0x01
/// bytes  4-7:   N           (number of labels, big-endian u32)
/// bytes  8..:   N bytes, each a class index in [0, n_classes)
/// ```
pub fn parse_idx_pair(
    image_bytes: &[u8],
    label_bytes: &[u8],
    n_classes: usize,
) -> Result<LabeledImages, DatasetError> {
    let bad = DatasetError::Format;

    // ── Image header ────────────────────────────────────────────────────────

    check_header(image_bytes, 16, 3, "image")?;
    let n_items = be_u32(image_bytes, 4);
    let rows = be_u32(image_bytes, 8);
    let cols = be_u32(image_bytes, 12);

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        bad(format!("IDX image file: rows * cols overflows (rows={rows}, cols={cols})."))
    })?;
    let data_len = n_items.checked_mul(n_pixels).ok_or_else(|| {
        bad(format!(
            "IDX image file: {n_items} items of {n_pixels} pixels overflows."
        ))
    })?;
    if image_bytes.len() - 16 < data_len {
        return Err(bad(format!(
            "IDX image file too short: header declares {n_items} items of {rows}×{cols} pixels \
             ({data_len} data bytes), but only {} follow the header.",
            image_bytes.len() - 16
        )));
    }

    // ── Label header ────────────────────────────────────────────────────────

    check_header(label_bytes, 8, 1, "label")?;
    let label_count = be_u32(label_bytes, 4);
    if label_count != n_items {
        return Err(bad(format!(
            "IDX file mismatch: image file declares {n_items} items but label file declares {label_count}."
        )));
    }
    if label_bytes.len() - 8 < n_items {
        return Err(bad(format!(
            "IDX label file too short: header declares {n_items} labels but only {} follow the header.",
            label_bytes.len() - 8
        )));
    }

    let labels = label_bytes[8..8 + n_items].to_vec();
    if let Some((i, &class)) = labels
        .iter()
        .enumerate()
        .find(|&(_, &class)| usize::from(class) >= n_classes)
    {
        return Err(bad(format!(
            "IDX label at index {i}: class {class} is out of range for {n_classes} classes."
        )));
    }

    Ok(LabeledImages {
        rows,
        cols,
        pixels: image_bytes[16..16 + data_len].to_vec(),
        labels,
    })
}

fn check_header(bytes: &[u8], header_len: usize, dims: u8, kind: &str) -> Result<(), DatasetError> {
    if bytes.len() < header_len {
        return Err(DatasetError::Format(format!(
            "IDX {kind} file too short: expected at least {header_len} header bytes, got {}.",
            bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(DatasetError::Format(format!(
            "IDX {kind} file: bytes 0-1 must be 0x00 0x00, got 0x{:02X} 0x{:02X}.",
            bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(DatasetError::Format(format!(
            "IDX {kind} file: dtype must be 0x08 (uint8), got 0x{:02X}.",
            bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(DatasetError::Format(format!(
            "IDX {kind} file: expected {dims} dimensions, got {}.",
            bytes[3]
        )));
    }
    Ok(())
}

fn be_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encodes images and labels as an IDX3/IDX1 byte pair.
    pub(crate) fn encode_idx(rows: u32, cols: u32, pixels: &[u8], labels: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let n = labels.len() as u32;
        let mut images = vec![0x00, 0x00, 0x08, 0x03];
        for v in [n, rows, cols] {
            images.extend_from_slice(&v.to_be_bytes());
        }
        images.extend_from_slice(pixels);

        let mut label_file = vec![0x00, 0x00, 0x08, 0x01];
        label_file.extend_from_slice(&n.to_be_bytes());
        label_file.extend_from_slice(labels);
        (images, label_file)
    }

    #[test]
    fn parses_a_small_pair() {
        let (images, labels) = encode_idx(2, 2, &[0, 255, 128, 64, 1, 2, 3, 4], &[7, 3]);
        let parsed = parse_idx_pair(&images, &labels, N_CLASSES).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.image(1), &[1, 2, 3, 4]);
        assert_eq!(parsed.labels, vec![7, 3]);
    }

    #[test]
    fn normalize_scales_to_unit_range() {
        let (images, labels) = encode_idx(1, 2, &[0, 255], &[1]);
        let parsed = parse_idx_pair(&images, &labels, N_CLASSES).unwrap();
        let norm = normalize(&parsed);
        assert_eq!(norm.values, vec![0.0, 1.0]);
        assert_eq!(norm.len(), 1);
    }

    #[test]
    fn rejects_wrong_dimensions() {
        let (mut images, labels) = encode_idx(1, 1, &[0], &[0]);
        images[3] = 0x01;
        let err = parse_idx_pair(&images, &labels, N_CLASSES).unwrap_err();
        assert!(err.to_string().contains("expected 3 dimensions"));
    }

    #[test]
    fn rejects_truncated_pixels() {
        let (images, labels) = encode_idx(2, 2, &[0, 1, 2], &[0]);
        assert!(parse_idx_pair(&images, &labels, N_CLASSES).is_err());
    }

    #[test]
    fn rejects_count_mismatch() {
        let (images, _) = encode_idx(1, 1, &[0, 0], &[0, 1]);
        let (_, labels) = encode_idx(1, 1, &[0], &[0]);
        let err = parse_idx_pair(&images, &labels, N_CLASSES).unwrap_err();
        assert!(err.to_string().contains("mismatch"));
    }

    #[test]
    fn rejects_out_of_range_class() {
        let (images, labels) = encode_idx(1, 1, &[0], &[10]);
        let err = parse_idx_pair(&images, &labels, N_CLASSES).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn directory_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let provider = IdxDirectory::new(dir.path());
        assert!(matches!(provider.load(), Err(DatasetError::Io { .. })));
    }

    #[test]
    fn directory_loads_train_and_test() {
        let dir = tempfile::tempdir().unwrap();
        let (images, labels) = encode_idx(1, 1, &[9, 8, 7], &[1, 2, 3]);
        for (name, bytes) in [
            (TRAIN_IMAGES, &images),
            (TRAIN_LABELS, &labels),
            (TEST_IMAGES, &images),
            (TEST_LABELS, &labels),
        ] {
            std::fs::write(dir.path().join(name), bytes).unwrap();
        }

        let (train, test) = IdxDirectory::new(dir.path()).load().unwrap();
        assert_eq!(train.labels, vec![1, 2, 3]);
        assert_eq!(test.pixels, vec![9, 8, 7]);
    }
}
