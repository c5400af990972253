//! The FIPS-205 ADRS (hash address) structure.
//!
//! Fields are big-endian integers packed into a flat 32-byte buffer:
//! `layer(4) || tree_high(4, always 0) || tree_low(8) || type(4) || word1(4)
//! || word2(4) || word3(4)`. Rather than the teacher crate's per-type
//! monomorphized structs (one Rust type per ADRS "shape"), this crate models
//! the FIPS-205 address generically: the three trailing words carry a
//! different meaning for each `type`, set through the transition methods
//! below, mirroring `setTypeAndClear` (FIPS-205 algorithm 2.9).

pub const WOTS_HASH: u32 = 0;
pub const WOTS_PK: u32 = 1;
pub const TREE: u32 = 2;
pub const FORS_TREE: u32 = 3;
pub const FORS_ROOTS: u32 = 4;
pub const WOTS_PRF: u32 = 5;
pub const FORS_PRF: u32 = 6;
/// Not a FIPS-205 type: this crate's masked PRF tree (spec §4.F) has no
/// standards analogue, so it gets its own address type to keep its domain
/// disjoint from the FIPS ADRS types above.
pub const PRF_TREE: u32 = 7;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Adrs([u8; 32]);

impl AsRef<[u8]> for Adrs {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Adrs {
    pub fn new() -> Self {
        Self([0; 32])
    }

    pub fn set_layer_address(&mut self, layer: u32) -> &mut Self {
        self.0[0..4].copy_from_slice(&layer.to_be_bytes());
        self
    }

    pub fn set_tree_address(&mut self, tree: u64) -> &mut Self {
        self.0[4..8].fill(0);
        self.0[8..16].copy_from_slice(&tree.to_be_bytes());
        self
    }

    pub fn tree_address(&self) -> u64 {
        u64::from_be_bytes(self.0[8..16].try_into().unwrap())
    }

    fn set_type(&mut self, ty: u32) -> &mut Self {
        self.0[16..20].copy_from_slice(&ty.to_be_bytes());
        self.0[20..32].fill(0);
        self
    }

    fn set_word1(&mut self, v: u32) -> &mut Self {
        self.0[20..24].copy_from_slice(&v.to_be_bytes());
        self
    }

    fn set_word2(&mut self, v: u32) -> &mut Self {
        self.0[24..28].copy_from_slice(&v.to_be_bytes());
        self
    }

    fn set_word3(&mut self, v: u32) -> &mut Self {
        self.0[28..32].copy_from_slice(&v.to_be_bytes());
        self
    }

    fn word3(&self) -> u32 {
        u32::from_be_bytes(self.0[28..32].try_into().unwrap())
    }

    /// `type = WOTS_HASH`, `word1 = keypair`, `word2 = chain`, `word3 = hash`.
    pub fn wots_hash(&mut self, keypair: u32) -> &mut Self {
        self.set_type(WOTS_HASH).set_word1(keypair)
    }

    pub fn set_chain_address(&mut self, chain: u32) -> &mut Self {
        self.set_word2(chain)
    }

    pub fn set_hash_address(&mut self, hash: u32) -> &mut Self {
        self.set_word3(hash)
    }

    pub fn hash_address(&self) -> u32 {
        self.word3()
    }

    /// `type = WOTS_PK`, `word1 = keypair`.
    pub fn wots_pk(&mut self, keypair: u32) -> &mut Self {
        self.set_type(WOTS_PK).set_word1(keypair)
    }

    /// `type = WOTS_PRF`, `word1 = keypair`, `word2 = chain`.
    pub fn wots_prf(&mut self, keypair: u32, chain: u32) -> &mut Self {
        self.set_type(WOTS_PRF).set_word1(keypair).set_word2(chain)
    }

    /// `type = TREE`, `word2 = tree_height`, `word3 = tree_index`.
    pub fn tree(&mut self, tree_height: u32, tree_index: u32) -> &mut Self {
        self.set_type(TREE).set_word2(tree_height).set_word3(tree_index)
    }

    /// `type = FORS_TREE`, `word1 = keypair`, `word2 = tree_height`, `word3 = tree_index`.
    pub fn fors_tree(&mut self, keypair: u32, tree_height: u32, tree_index: u32) -> &mut Self {
        self.set_type(FORS_TREE)
            .set_word1(keypair)
            .set_word2(tree_height)
            .set_word3(tree_index)
    }

    /// `type = FORS_PRF`, `word1 = keypair`, `word3 = tree_index`.
    pub fn fors_prf(&mut self, keypair: u32, tree_index: u32) -> &mut Self {
        self.set_type(FORS_PRF).set_word1(keypair).set_word3(tree_index)
    }

    /// `type = FORS_ROOTS`, `word1 = keypair`.
    pub fn fors_roots(&mut self, keypair: u32) -> &mut Self {
        self.set_type(FORS_ROOTS).set_word1(keypair)
    }

    /// `type = PRF_TREE`, `word1` carries the caller-chosen PRF-tree tag
    /// (distinguishes a Merkle-key derivation from a WOTS-leaf derivation at
    /// the same hypertree layer), `word2 = layer`.
    pub fn prf_tree(&mut self, tag: u32, layer: u32) -> &mut Self {
        self.set_type(PRF_TREE).set_word1(tag).set_word2(layer)
    }

    pub fn tree_height(&self) -> u32 {
        u32::from_be_bytes(self.0[24..28].try_into().unwrap())
    }

    pub fn tree_index(&self) -> u32 {
        self.word3()
    }
}
