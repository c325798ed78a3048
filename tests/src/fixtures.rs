//! Shared fixtures: encrypted three-burst bundles with known keys.

use rand::Rng;

use a52crack_attack::{index_of_r4, CipherTextBundle};
use a52crack_cipher::consts::{FRAME_ID_BITS, SECRET_KEY_BITS};
use a52crack_cipher::A52;
use a52crack_code::{ChannelCode, CODEWORD_BITS, SOURCEWORD_BITS};

/// An attack problem with its known solution.
pub struct Fixture {
    /// The secret key the attack must recover.
    pub key: [u8; SECRET_KEY_BITS],
    /// The public frame id.
    pub frame_id: [u8; FRAME_ID_BITS],
    /// The three encrypted codewords.
    pub bundle: CipherTextBundle,
    /// The R4 hypothesis index the attack must verify.
    pub index: u32,
}

impl Fixture {
    /// Encrypts three random source words under a random key and frame id.
    pub fn random(code: &ChannelCode, rng: &mut impl Rng) -> Self {
        let key = random_key(rng);
        let frame_id = random_frame_id(rng);
        let bundle = encrypt_bundle(&key, &frame_id, code, rng);
        let index = true_hypothesis_index(&key, &frame_id);
        Self {
            key,
            frame_id,
            bundle,
            index,
        }
    }
}

/// Draws a random 64-bit key.
pub fn random_key(rng: &mut impl Rng) -> [u8; SECRET_KEY_BITS] {
    std::array::from_fn(|_| rng.gen_range(0..=1))
}

/// Draws a random 22-bit frame id.
pub fn random_frame_id(rng: &mut impl Rng) -> [u8; FRAME_ID_BITS] {
    std::array::from_fn(|_| rng.gen_range(0..=1))
}

/// Encrypts three random source words: encode through the channel code,
/// then XOR three consecutive 456-bit keystream frames.
pub fn encrypt_bundle(
    key: &[u8; SECRET_KEY_BITS],
    frame_id: &[u8; FRAME_ID_BITS],
    code: &ChannelCode,
    rng: &mut impl Rng,
) -> CipherTextBundle {
    let mut cipher = A52::new();
    cipher.key_setup(key, frame_id);
    let keystream = cipher.keystream(3 * CODEWORD_BITS);

    let bursts: Vec<Vec<u8>> = (0..3)
        .map(|m| {
            let source: Vec<u8> = (0..SOURCEWORD_BITS).map(|_| rng.gen_range(0..=1u8)).collect();
            let mut burst = code.encode(&source).expect("fixture source word");
            for (bit, ks) in burst
                .iter_mut()
                .zip(&keystream[m * CODEWORD_BITS..(m + 1) * CODEWORD_BITS])
            {
                *bit ^= ks;
            }
            burst
        })
        .collect();

    CipherTextBundle::new(bursts.try_into().expect("three bursts"), frame_id)
        .expect("fixture bundle")
}

/// The hypothesis index a correct attack on this key and frame id must
/// land on: the index of R4's pre-diffusion contents.
pub fn true_hypothesis_index(
    key: &[u8; SECRET_KEY_BITS],
    frame_id: &[u8; FRAME_ID_BITS],
) -> u32 {
    let mut cipher = A52::new();
    cipher.load(key, frame_id);
    index_of_r4(&cipher.registers().r4)
}
