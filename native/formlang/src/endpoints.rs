//! Request handlers behind the `/dfa`, `/nfa`, `/cfg` and `/pda` routes.
//!
//! These are transport free: each takes the raw definition text and returns
//! a report whose field names match the JSON bodies the routes answer with.
//! Serving them over HTTP is left to the caller.

use crate::automaton::{DFA, EpsilonNFA, PDA};
use crate::error::{EngineError, ParseError};
use crate::grammar::CFG;
use log::debug;

/// Answer to `POST /dfa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DfaReport {
    pub is_valid_dfa: bool,
    /// Only computed for a valid DFA; `false` otherwise.
    pub accepts_input: bool,
}

/// Answer to `POST /nfa`: the converted DFA in definition form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NfaReport {
    pub dfa: String,
}

/// Answer to `POST /cfg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgReport {
    pub is_valid_cfg: bool,
}

/// Answer to `POST /pda`: the equivalent grammar in definition form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdaReport {
    pub cfg: String,
}

/// Validate a DFA definition and, if it is valid, run it on `input`.
///
/// A definition that does not parse is reported as invalid.
pub fn check_dfa(definition: &str, input: &str) -> DfaReport {
    let dfa = match definition.parse::<DFA>() {
        Ok(dfa) => dfa,
        Err(err) => {
            debug!("rejecting DFA definition: {err}");
            return DfaReport {
                is_valid_dfa: false,
                accepts_input: false,
            };
        }
    };
    let is_valid_dfa = dfa.validate();
    DfaReport {
        is_valid_dfa,
        accepts_input: is_valid_dfa && dfa.accepts(input),
    }
}

/// Convert an NFA definition to the definition of an equivalent DFA.
pub fn convert_nfa(definition: &str) -> Result<NfaReport, ParseError> {
    let nfa: EpsilonNFA = definition.parse()?;
    Ok(NfaReport {
        dfa: nfa.to_dfa().serialize(),
    })
}

pub fn check_cfg(definition: &str) -> Result<CfgReport, ParseError> {
    let cfg: CFG = definition.parse()?;
    Ok(CfgReport {
        is_valid_cfg: cfg.validate(),
    })
}

/// Convert a PDA definition to an equivalent grammar. The conversion itself
/// is not implemented, so a well-formed PDA yields
/// [`EngineError::Unsupported`].
pub fn convert_pda(definition: &str) -> Result<PdaReport, EngineError> {
    let pda: PDA = definition.parse()?;
    let cfg = pda.to_cfg()?;
    Ok(PdaReport {
        cfg: cfg.serialize(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Unsupported;

    const PARITY: &str = "q0,q1\n0,1\nq0\nq1\nq0,0,q0\nq0,1,q1\nq1,0,q1\nq1,1,q0\n";

    #[test]
    fn test_check_dfa() {
        assert_eq!(
            check_dfa(PARITY, "1"),
            DfaReport {
                is_valid_dfa: true,
                accepts_input: true
            }
        );
        assert_eq!(
            check_dfa(PARITY, "11"),
            DfaReport {
                is_valid_dfa: true,
                accepts_input: false
            }
        );
    }

    #[test]
    fn test_invalid_dfa_never_accepts() {
        // q0 --0--> q0 would accept "0", but the accept state is undeclared.
        let report = check_dfa("q0\n0\nq0\nq0,q5\nq0,0,q0\n", "0");
        assert!(!report.is_valid_dfa);
        assert!(!report.accepts_input);

        let report = check_dfa("q0\n0\n", "");
        assert!(!report.is_valid_dfa);
    }

    #[test]
    fn test_convert_nfa() {
        let report = convert_nfa("q0,q1\na\nq0\nq1\nq0,e,q1\nq1,a,q1\n").unwrap();
        assert_eq!(report.dfa, "q0q1,q1\na\nq0q1\nq0q1,q1\nq0q1,a,q1\nq1,a,q1\n");
        assert!(check_dfa(&report.dfa, "aaa").accepts_input);

        assert!(convert_nfa("q0\na,e\nq0\n\n").is_err());
    }

    #[test]
    fn test_check_cfg() {
        assert!(check_cfg("S\na\nS\nS a S\nS\n").unwrap().is_valid_cfg);
        assert!(!check_cfg("S\na\nS\nS b\n").unwrap().is_valid_cfg);
    }

    #[test]
    fn test_convert_pda_is_unsupported() {
        assert_eq!(
            convert_pda("p\na\nZ\np\np\np a Z p Z\n"),
            Err(EngineError::Unsupported(Unsupported::PdaToCfg))
        );
        assert!(matches!(
            convert_pda("p\na\n"),
            Err(EngineError::Parse(ParseError::MissingLine { .. }))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_report_field_names() {
        let json = serde_json::to_value(check_dfa(PARITY, "1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "is_valid_dfa": true, "accepts_input": true })
        );

        let json = serde_json::to_value(CfgReport { is_valid_cfg: false }).unwrap();
        assert_eq!(json, serde_json::json!({ "is_valid_cfg": false }));

        let report: NfaReport = serde_json::from_str(r#"{"dfa":"q0\na\nq0\n\n"}"#).unwrap();
        assert_eq!(report.dfa, "q0\na\nq0\n\n");
    }
}
