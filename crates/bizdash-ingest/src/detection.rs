//! File type and separator detection
//!
//! The file type comes from keywords in the file name, the separator from
//! counting pipes and commas at the start of the content.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use bizdash_common::{BizdashError, lazy_trace};

/// Bytes of content inspected for separator detection
pub const SNIFF_BYTES: usize = 2000;

/// Data category of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Retailer,
    Sellin,
    Transaction,
    Transfer,
    Visit,
    Other,
}

impl FileKind {
    pub const ALL: [FileKind; 6] = [
        FileKind::Retailer,
        FileKind::Sellin,
        FileKind::Transaction,
        FileKind::Transfer,
        FileKind::Visit,
        FileKind::Other,
    ];

    /// Filename keywords per category, checked in declaration order
    const KEYWORDS: [(FileKind, &'static [&'static str]); 5] = [
        (FileKind::Retailer, &["retailer", "organisasi"]),
        (FileKind::Sellin, &["sellin", "distribusi"]),
        (FileKind::Transaction, &["transaksi", "transaction"]),
        (FileKind::Transfer, &["transfer"]),
        (FileKind::Visit, &["dsevisit", "visit"]),
    ];

    /// Case-insensitive keyword match on the file name. The first matching category wins.
    pub fn from_filename(file_name: &str) -> Self {
        let name = file_name.to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
            .map(|(kind, _)| *kind)
            .unwrap_or(FileKind::Other)
    }

    /// Separator for content holding as many pipes as commas.
    ///
    /// Retailer and sellin files look for a pipe, the transaction-like files
    /// for a comma; whichever is absent falls back to the other. `Other`
    /// always settles on a comma.
    pub fn tie_separator(self, count: usize) -> Separator {
        match self {
            FileKind::Retailer | FileKind::Sellin if count > 0 => Separator::Pipe,
            FileKind::Retailer | FileKind::Sellin => Separator::Comma,
            FileKind::Transaction | FileKind::Transfer | FileKind::Visit if count == 0 => {
                Separator::Pipe
            }
            _ => Separator::Comma,
        }
    }

    /// Known source column to canonical field suggestions
    pub fn suggestions(self) -> &'static [(&'static str, &'static str)] {
        match self {
            FileKind::Retailer => &[
                ("ORGANIZATION ID", "retailer_id"),
                ("ORGANIZATION NAME", "retailer_name"),
                ("PERMANENTADDRES_STREET ADDRESS", "address"),
                ("CONTACT NUMBER", "contact_info"),
                ("STATUS", "status"),
            ],
            FileKind::Sellin => &[
                ("TRANSACTION DATETIME", "transaction_date"),
                ("TRANSACTION ID", "transaction_id"),
                ("DEST_ORGANIZATIONNAME", "retailer_name"),
                ("PRODUCT NAME", "product_name"),
                ("QTY", "quantity"),
                ("FINAL VALUE", "amount"),
            ],
            FileKind::Transaction => &[
                ("DateTime", "transaction_date"),
                ("Transaction ID", "transaction_id"),
                ("Organization Name", "retailer_name"),
                ("Product Name", "product_name"),
                ("Amount_Debit(IDR)", "amount"),
            ],
            FileKind::Transfer => &[
                ("DateTime", "transaction_date"),
                ("Transaction ID", "transaction_id"),
                ("Organization Name", "from_retailer"),
                ("Credit Party Name", "to_retailer"),
                ("Amount", "amount"),
            ],
            FileKind::Visit => &[
                ("Visit Date", "visit_date"),
                ("Outlet Name", "retailer_name"),
                ("DSE Name", "dse_name"),
                ("Visit Status", "status"),
            ],
            FileKind::Other => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Retailer => "retailer",
            FileKind::Sellin => "sellin",
            FileKind::Transaction => "transaction",
            FileKind::Transfer => "transfer",
            FileKind::Visit => "visit",
            FileKind::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileKind::Retailer => "Retailer/Organization Data",
            FileKind::Sellin => "Sell-in/Distribution Data",
            FileKind::Transaction => "Transaction Data",
            FileKind::Transfer => "Transfer Data",
            FileKind::Visit => "Visit Data",
            FileKind::Other => "Other Data",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FileKind::Retailer => "Store info, outlets, locations",
            FileKind::Sellin => "Stock distribution, product movement",
            FileKind::Transaction => "Sales transactions, customer purchases",
            FileKind::Transfer => "Balance transfers, fund movements",
            FileKind::Visit => "DSE visits, outlet interactions",
            FileKind::Other => "Custom data type",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = BizdashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BizdashError::IllegalArgument(format!("unknown file type '{s}'")))
    }
}

/// Field separator of a delimited text file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Separator {
    #[serde(rename = ",")]
    Comma,
    #[serde(rename = "|")]
    Pipe,
}

impl Separator {
    pub fn as_char(self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Pipe => '|',
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Pick the more frequent of pipe and comma in the first [`SNIFF_BYTES`] of content
pub fn detect_separator(content: &[u8], kind: FileKind) -> Separator {
    let head = &content[..content.len().min(SNIFF_BYTES)];
    let text = String::from_utf8_lossy(head);

    let pipes = text.matches('|').count();
    let commas = text.matches(',').count();

    match pipes.cmp(&commas) {
        std::cmp::Ordering::Greater => Separator::Pipe,
        std::cmp::Ordering::Less => Separator::Comma,
        std::cmp::Ordering::Equal => kind.tie_separator(pipes),
    }
}

/// Everything known about a file before it is parsed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub kind: FileKind,
    pub separator: Separator,
    pub suggestions: BTreeMap<String, String>,
}

pub fn detect(file_name: &str, content: &[u8]) -> Detection {
    lazy_trace("detect", || {
        let kind = FileKind::from_filename(file_name);
        let separator = detect_separator(content, kind);
        let suggestions = kind
            .suggestions()
            .iter()
            .map(|(source, field)| (source.to_string(), field.to_string()))
            .collect();

        Detection {
            kind,
            separator,
            suggestions,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(FileKind::from_filename("retailer_2024.csv"), FileKind::Retailer);
        assert_eq!(FileKind::from_filename("DATA_ORGANISASI.csv"), FileKind::Retailer);
        assert_eq!(FileKind::from_filename("sellin_jan.csv"), FileKind::Sellin);
        assert_eq!(FileKind::from_filename("Distribusi-Q1.xlsx"), FileKind::Sellin);
        assert_eq!(FileKind::from_filename("transaksi.csv"), FileKind::Transaction);
        assert_eq!(FileKind::from_filename("Transaction_log.csv"), FileKind::Transaction);
        assert_eq!(FileKind::from_filename("transfer.csv"), FileKind::Transfer);
        assert_eq!(FileKind::from_filename("DSEVisit_report.csv"), FileKind::Visit);
        assert_eq!(FileKind::from_filename("summary.csv"), FileKind::Other);
    }

    #[test]
    fn test_first_keyword_match_wins() {
        assert_eq!(
            FileKind::from_filename("retailer_transfer.csv"),
            FileKind::Retailer
        );
        assert_eq!(
            FileKind::from_filename("transaction_visit.csv"),
            FileKind::Transaction
        );
    }

    #[test]
    fn test_separator_by_frequency() {
        assert_eq!(
            detect_separator(b"a|b|c|d|e|f,g,h", FileKind::Transaction),
            Separator::Pipe
        );
        assert_eq!(
            detect_separator(b"a,b,c,d,e,f|g|h", FileKind::Retailer),
            Separator::Comma
        );
    }

    #[test]
    fn test_separator_tie_uses_category_preference() {
        let retailer = detect("retailer.csv", b"a|b,c");
        assert_eq!(retailer.separator, Separator::Pipe);

        let visit = detect("visit.csv", b"a|b,c");
        assert_eq!(visit.separator, Separator::Comma);

        let other = detect("data.csv", b"no separators here");
        assert_eq!(other.separator, Separator::Comma);
    }

    #[test]
    fn test_separator_without_any_separator() {
        assert_eq!(detect("retailer.csv", b"ID\nR1").separator, Separator::Comma);
        assert_eq!(detect("sellin.csv", b"").separator, Separator::Comma);
        assert_eq!(detect("transaction.csv", b"ID\n1").separator, Separator::Pipe);
        assert_eq!(detect("dsevisit.csv", b"ID").separator, Separator::Pipe);
        assert_eq!(detect("other.csv", b"ID").separator, Separator::Comma);
    }

    #[test]
    fn test_separator_only_inspects_leading_bytes() {
        let mut content = "a,b\n".repeat(SNIFF_BYTES / 4);
        content.push_str(&"|".repeat(SNIFF_BYTES));
        assert_eq!(
            detect_separator(content.as_bytes(), FileKind::Sellin),
            Separator::Comma
        );
    }

    #[test]
    fn test_detect_carries_suggestions() {
        let detection = detect("sellin.csv", b"TRANSACTION ID|QTY\n1|2");
        assert_eq!(detection.kind, FileKind::Sellin);
        assert_eq!(detection.separator, Separator::Pipe);
        assert_eq!(detection.suggestions.get("QTY").map(String::as_str), Some("quantity"));

        assert!(detect("notes.csv", b"").suggestions.is_empty());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("Visit".parse::<FileKind>().unwrap(), FileKind::Visit);
        assert!("unknown".parse::<FileKind>().is_err());
    }

    #[test]
    fn test_separator_serializes_as_char() {
        assert_eq!(serde_json::to_string(&Separator::Pipe).unwrap(), "\"|\"");
        assert_eq!(serde_json::to_string(&FileKind::Sellin).unwrap(), "\"sellin\"");
    }
}
