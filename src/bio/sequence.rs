use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeqRecord {
    pub id: String,
    pub description: Option<String>,
    pub residues: Vec<u8>,
}

impl SeqRecord {
    pub fn new(id: String, residues: Vec<u8>) -> Self {
        Self {
            id,
            description: None,
            residues,
        }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Residues as text with all internal whitespace removed, the form
    /// required by the submission endpoint.
    pub fn cleaned(&self) -> String {
        self.residues
            .iter()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|&c| c as char)
            .collect()
    }

    pub fn header(&self) -> String {
        match &self.description {
            Some(desc) => format!(">{} {}", self.id, desc),
            None => format!(">{}", self.id),
        }
    }

    /// 5' probe for chimera checking: the first `len` residues.
    /// Shorter sequences are returned whole.
    pub fn probe_5end(&self, len: usize) -> SeqRecord {
        let end = len.min(self.residues.len());
        SeqRecord {
            id: format!("{}_5end", self.id),
            description: self.description.clone(),
            residues: self.residues[..end].to_vec(),
        }
    }

    /// 3' probe for chimera checking: the last `len` residues.
    pub fn probe_3end(&self, len: usize) -> SeqRecord {
        let start = self.residues.len().saturating_sub(len);
        SeqRecord {
            id: format!("{}_3end", self.id),
            description: self.description.clone(),
            residues: self.residues[start..].to_vec(),
        }
    }
}
