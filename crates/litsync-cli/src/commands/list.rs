use litsync_core::zotero::Item;

use super::common::{self, SyncOptions};

pub struct List;

impl List {
    pub fn execute(options: &SyncOptions) -> anyhow::Result<()> {
        let config = options.load_config()?;
        let client = common::zotero_client(&config)?;

        let (items, version) = client
            .fetch_items(None)
            .map_err(common::explain_zotero_error)?;

        if items.is_empty() {
            println!("No items found in the Zotero library.");
            return Ok(());
        }

        for item in &items {
            println!("{}", Self::line(item));
        }

        if options.verbose {
            println!("\n{} item(s), library version {version}", items.len());
        }
        Ok(())
    }

    fn line(item: &Item) -> String {
        format!(
            "Item: {} | Key: {} | {}",
            item.data.item_type,
            item.key,
            item.title()
        )
    }
}
