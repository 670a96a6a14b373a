use std::path::Path;

use anyhow::{bail, Result};
use gc_audit::VerifyResult;

pub fn verify(path: &Path) -> Result<()> {
    match gc_audit::verify_hash_chain(path)? {
        VerifyResult::Valid { lines } => {
            println!("audit_chain=valid lines={} path={}", lines, path.display());
            Ok(())
        }
        VerifyResult::Broken { line, reason } => {
            println!("audit_chain=broken line={} path={}", line, path.display());
            bail!("AUDIT_CHAIN_BROKEN at line {line}: {reason}")
        }
    }
}
