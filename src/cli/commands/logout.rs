use crate::config::Config;
use crate::error::Result;

pub fn execute(config: &Config) -> Result<()> {
    let store = config.credential_store();

    if store.remove()? {
        println!("✓ Saved session cookie removed");
    } else {
        println!("No saved session cookie");
    }

    Ok(())
}
