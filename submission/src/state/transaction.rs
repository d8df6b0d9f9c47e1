//! Transaction identities and the transaction envelope handed to the
//! submission layer.

use std::fmt;

use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, deserialize, rancor, with::Skip};

/// Content hash identifying a transaction.
///
/// Computed with blake3 over the opaque transaction payload. Totally ordered
/// so that batch scheduling and tests are deterministic.
#[derive(
    Archive, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct TxId([u8; blake3::OUT_LEN]);

impl TxId {
    /// Hashes a transaction payload into its id.
    pub fn from_payload(payload: &[u8]) -> Self {
        Self(blake3::hash(payload).into())
    }

    /// Wraps a precomputed hash.
    pub fn from_bytes(bytes: [u8; blake3::OUT_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; blake3::OUT_LEN] {
        &self.0
    }

    /// Short hex form for log fields.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self.short())
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A consumed outpoint of a transaction.
///
/// `Spend` names the transaction that produced the consumed output; `Unknown`
/// marks an input whose provenance the wallet cannot resolve. Unknown inputs
/// are ignored by dependency analysis.
#[derive(Archive, Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxIn {
    /// Spends output `index` of the transaction identified by `source`.
    Spend {
        /// Producing transaction.
        source: TxId,
        /// Output index within the producing transaction.
        index: u32,
    },
    /// Provenance unknown; carries no dependency information.
    Unknown,
}

impl TxIn {
    /// The producing transaction id, if this input names one.
    pub fn source(&self) -> Option<TxId> {
        match self {
            TxIn::Spend { source, .. } => Some(*source),
            TxIn::Unknown => None,
        }
    }
}

/// A transaction as the submission layer sees it: an opaque payload plus the
/// outpoints it consumes.
///
/// The payload is whatever the wallet serialized for the chain; the scheduler
/// never inspects it beyond hashing. The cached id is skipped by the archive
/// and recomputed on decode, so a wire hop cannot smuggle a mismatched id.
#[derive(Archive, Deserialize, Serialize, Debug, Clone)]
pub struct TxAux {
    /// Serialized transaction body, broadcast verbatim.
    pub payload: Vec<u8>,
    /// Outpoints consumed by this transaction.
    pub inputs: Vec<TxIn>,
    #[rkyv(with = Skip)]
    tx_id: TxId,
}

impl TxAux {
    /// Builds an envelope, hashing the payload into its id.
    pub fn new(payload: Vec<u8>, inputs: Vec<TxIn>) -> Self {
        let tx_id = TxId::from_payload(&payload);
        Self {
            payload,
            inputs,
            tx_id,
        }
    }

    /// The content hash of this transaction.
    pub fn id(&self) -> TxId {
        self.tx_id
    }

    /// Ids of the transactions whose outputs this one consumes, unknown
    /// inputs excluded.
    pub fn input_sources(&self) -> impl Iterator<Item = TxId> + '_ {
        self.inputs.iter().filter_map(TxIn::source)
    }

    /// Encodes the envelope for a wire hop.
    pub fn to_bytes(&self) -> Result<AlignedVec, rancor::Error> {
        rkyv::to_bytes::<rancor::Error>(self)
    }

    /// Decodes an envelope from its wire bytes, recomputing the id.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, rancor::Error> {
        let archived = unsafe { rkyv::access_unchecked::<ArchivedTxAux>(bytes) };
        let mut tx = deserialize::<TxAux, rancor::Error>(archived)?;
        tx.tx_id = TxId::from_payload(&tx.payload);
        Ok(tx)
    }
}
