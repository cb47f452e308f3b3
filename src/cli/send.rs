//! Send command.

use tracing::info;

use crate::cli::output;
use crate::cli::SendArgs;
use crate::core::cancel::CancelToken;
use crate::core::credential::EnvCredentials;
use crate::core::enumerate::{enumerate, into_items, Selection};
use crate::core::remote::HttpClient;
use crate::core::report::Report;
use crate::core::workflow::Workflow;
use crate::error::Result;

/// Enumerate files, upload them into a new package and print the link.
pub fn execute(args: &SendArgs) -> Result<()> {
    let options = args.options()?;
    let config = options.to_workflow(&EnvCredentials)?;
    let selection = Selection::new(options.include.as_deref(), options.exclude.as_deref())?;

    let cancel = CancelToken::new();
    let files = enumerate(&args.paths, &selection)?;
    let items = into_items(files, &cancel);
    info!(files = items.len(), endpoint = config.endpoint(), "sending package");

    let client = HttpClient::new(config.endpoint(), config.credential().clone(), cancel.clone())?;
    let workflow = Workflow::new(config, client).with_cancel(cancel);
    let outcome = workflow.run(&items, Report::with_listener(output::dimmed));

    if let Some(err) = outcome.error {
        return Err(err);
    }

    output::success("package finalized");
    if let Some(url) = &outcome.url {
        output::kv("link", output::path(&url.url));
        if url.notified.is_empty() {
            output::kv("notified", "nobody");
        } else {
            output::kv("notified", url.notified.join(", "));
        }
    }
    Ok(())
}
