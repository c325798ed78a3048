//! The resolution-matrix dictionary.
//!
//! For every possible pre-diffusion R4 value, the 1368 keystream equations
//! of three consecutive codewords are folded through the parity-check
//! matrix H into 816 syndrome equations over the variable space. These
//! per-hypothesis "resolution matrices" are independent of the key and
//! frame id, so they are built once, persisted, and loaded read-only for
//! every attack.
//!
//! The store is a bare sequence of fixed-size records in ascending
//! hypothesis-index order; each record holds its 816 rows MSB-first
//! bit-packed, 82 bytes per row.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use a52crack_cipher::consts::{R4_BITS, R4_CONST_POS};
use a52crack_code::{encoding_matrix, parity_check_matrix, CODEWORD_BITS, SYNDROME_BITS};
use a52crack_common::{bits, BinMatrix, Error};

use crate::equations::EquationGenerator;
use crate::vars::{VarVec, TOTAL_VARS};

/// Ciphertext codewords needed for one attack.
pub const NEEDED_BURSTS: usize = 3;
/// Keystream equations generated per hypothesis.
pub const EQUATIONS_PER_HYPOTHESIS: usize = NEEDED_BURSTS * CODEWORD_BITS;
/// Rows of one resolution matrix.
pub const SYSTEM_ROWS: usize = NEEDED_BURSTS * SYNDROME_BITS;
/// Bytes of one bit-packed matrix row.
pub const ROW_BYTES: usize = TOTAL_VARS / 8;
/// Bytes of one persisted record.
pub const RECORD_BYTES: usize = SYSTEM_ROWS * ROW_BYTES;
/// Number of R4 hypotheses, and thus of dictionary records.
pub const HYPOTHESIS_COUNT: usize = 1 << (R4_BITS - 1);

/// Expands a hypothesis index into the 17-bit R4 contents.
///
/// The constant cell is forced to 1; the 16 index bits fill the remaining
/// cells, low bits below the constant cell and high bits above it.
pub fn r4_from_index(index: u32) -> [u8; R4_BITS] {
    debug_assert!((index as usize) < HYPOTHESIS_COUNT);
    let mut r4 = [0u8; R4_BITS];
    for k in 0..R4_CONST_POS {
        r4[k] = ((index >> k) & 1) as u8;
    }
    r4[R4_CONST_POS] = 1;
    for k in R4_CONST_POS..R4_BITS - 1 {
        r4[k + 1] = ((index >> k) & 1) as u8;
    }
    r4
}

/// The hypothesis index of a concrete R4 value.
pub fn index_of_r4(r4: &[u8; R4_BITS]) -> u32 {
    let mut index = 0u32;
    for k in 0..R4_CONST_POS {
        index |= u32::from(r4[k]) << k;
    }
    for k in R4_CONST_POS..R4_BITS - 1 {
        index |= u32::from(r4[k + 1]) << k;
    }
    index
}

/// One precomputed 816×656 system, bit-packed row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionMatrix {
    data: Vec<u8>,
}

impl ResolutionMatrix {
    /// Builds the resolution matrix of one hypothesis by folding its
    /// keystream equations through H.
    pub fn build(index: u32, h: &BinMatrix) -> Self {
        let equations = EquationGenerator::equations(r4_from_index(index), EQUATIONS_PER_HYPOTHESIS);
        let packed: Vec<Vec<u8>> = equations.iter().map(VarVec::to_packed).collect();

        let mut data = vec![0u8; RECORD_BYTES];
        for burst in 0..NEEDED_BURSTS {
            for r in 0..SYNDROME_BITS {
                let row = burst * SYNDROME_BITS + r;
                let acc = &mut data[row * ROW_BYTES..(row + 1) * ROW_BYTES];
                for c in 0..CODEWORD_BITS {
                    if h.get(r, c) == 1 {
                        bits::xor_in_place(acc, &packed[burst * CODEWORD_BITS + c]);
                    }
                }
            }
        }
        Self { data }
    }

    /// Wraps a persisted record.
    ///
    /// # Panics
    /// Panics if `data` is not exactly one record.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        assert_eq!(data.len(), RECORD_BYTES, "malformed dictionary record");
        Self { data }
    }

    /// The packed record bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Row `r` as a packed 82-byte slice.
    #[inline]
    pub fn row(&self, r: usize) -> &[u8] {
        &self.data[r * ROW_BYTES..(r + 1) * ROW_BYTES]
    }

    /// Coefficient at (`r`, `col`).
    #[inline]
    pub fn row_bit(&self, r: usize, col: usize) -> u8 {
        bits::get_bit(self.row(r), col)
    }
}

/// A loaded, read-only set of resolution matrices over a contiguous
/// hypothesis-index range.
pub struct Dictionary {
    first_index: u32,
    entries: Vec<ResolutionMatrix>,
}

impl Dictionary {
    /// Loads the full persisted dictionary into memory.
    ///
    /// A missing, truncated or oversized store is fatal and reported as a
    /// dictionary error, never as a partial load.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| {
            Error::Dictionary(format!("failed to open {}: {e}", path.display()))
        })?;
        let expected = (HYPOTHESIS_COUNT * RECORD_BYTES) as u64;
        let actual = file
            .metadata()
            .map_err(|e| Error::Dictionary(format!("failed to stat {}: {e}", path.display())))?
            .len();
        if actual != expected {
            return Err(Error::Dictionary(format!(
                "{} holds {actual} bytes, expected {expected}",
                path.display()
            )));
        }

        info!("loading resolution dictionary from {}", path.display());
        let mut reader = BufReader::new(file);
        let mut entries = Vec::with_capacity(HYPOTHESIS_COUNT);
        for index in 0..HYPOTHESIS_COUNT {
            let mut data = vec![0u8; RECORD_BYTES];
            reader.read_exact(&mut data).map_err(|e| {
                Error::Dictionary(format!("failed to read record {index}: {e}"))
            })?;
            entries.push(ResolutionMatrix::from_bytes(data));
        }
        info!("dictionary loaded, {} records", entries.len());
        Ok(Self {
            first_index: 0,
            entries,
        })
    }

    /// Builds the matrices of a contiguous index sub-range in memory.
    pub fn build_range(range: Range<u32>, h: &BinMatrix) -> Self {
        let entries = range.clone().map(|i| ResolutionMatrix::build(i, h)).collect();
        Self {
            first_index: range.start,
            entries,
        }
    }

    /// First hypothesis index covered.
    pub fn first_index(&self) -> u32 {
        self.first_index
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The covered hypothesis-index range.
    pub fn indices(&self) -> Range<u32> {
        self.first_index..self.first_index + self.entries.len() as u32
    }

    /// The record of an absolute hypothesis index.
    ///
    /// # Panics
    /// Panics if `index` lies outside the covered range.
    pub fn get(&self, index: u32) -> &ResolutionMatrix {
        assert!(
            self.indices().contains(&index),
            "hypothesis index {index} outside dictionary range"
        );
        &self.entries[(index - self.first_index) as usize]
    }
}

/// Splits `0..total` into `workers` equal contiguous ranges.
pub(crate) fn partition(total: usize, workers: usize) -> Result<Vec<Range<u32>>, Error> {
    if workers == 0 || total % workers != 0 {
        return Err(Error::Config(format!(
            "worker count {workers} must evenly divide the hypothesis range of {total}"
        )));
    }
    let chunk = (total / workers) as u32;
    Ok((0..workers as u32).map(|w| w * chunk..(w + 1) * chunk).collect())
}

/// Builds and persists the full dictionary.
///
/// The index space is split into equal contiguous ranges, one per worker;
/// each worker streams its records into an independent part file, and the
/// parts are concatenated in index order afterwards. Build order within
/// the file is therefore index order regardless of worker scheduling.
pub fn build_to_file(path: &Path, workers: usize) -> Result<(), Error> {
    let ranges = partition(HYPOTHESIS_COUNT, workers)?;

    let g = encoding_matrix();
    let h = parity_check_matrix(&g);
    info!(workers, "building resolution dictionary ({HYPOTHESIS_COUNT} hypotheses)");

    let parts: Vec<PathBuf> = (0..workers).map(|w| part_path(path, w)).collect();

    std::thread::scope(|scope| -> Result<(), Error> {
        let mut handles = Vec::with_capacity(workers);
        for (worker, range) in ranges.into_iter().enumerate() {
            let h = &h;
            let part = parts[worker].clone();
            handles.push(scope.spawn(move || -> Result<(), Error> {
                let mut writer = BufWriter::new(File::create(&part)?);
                for index in range.clone() {
                    let matrix = ResolutionMatrix::build(index, h);
                    writer.write_all(matrix.as_bytes())?;
                    if index % 1024 == 0 {
                        debug!(worker, index, "dictionary build progress");
                    }
                }
                writer.flush()?;
                info!(worker, "range {}..{} done", range.start, range.end);
                Ok(())
            }));
        }
        for handle in handles {
            handle.join().expect("dictionary build worker panicked")?;
        }
        Ok(())
    })?;

    // Concatenate the parts in index order.
    let mut writer = BufWriter::new(File::create(path)?);
    for part in &parts {
        let mut reader = File::open(part)?;
        std::io::copy(&mut reader, &mut writer)?;
        fs::remove_file(part)?;
    }
    writer.flush()?;
    info!("dictionary written to {}", path.display());
    Ok(())
}

fn part_path(path: &Path, worker: usize) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dictionary".into());
    path.with_file_name(format!("{name}.part{worker}"))
}
