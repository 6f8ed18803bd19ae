//! Removal watch example - react when an element leaves the document

use dom::{DomArena, Viewport};
use page::{Page, PageConfig};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Pass --poll to simulate a platform without native observation
    let mut config = PageConfig::default();
    if std::env::args().any(|arg| arg == "--poll") {
        config.capabilities.mutation_observer = false;
        config.poll_interval_ms = 250;
    }

    let document = DomArena::with_document(Viewport::default());
    let body = document.body().ok_or("document has no body")?;
    let page = Page::new(config, document);

    // Log every structural change
    let mut mutation_rx = page.mutations().stream();
    tokio::spawn(async move {
        while let Ok(event) = mutation_rx.recv().await {
            println!("📢 Mutation ({:?}): {} record(s)", event.source, event.records.len());
        }
    });

    page.mark_ready();
    page.start().await?;
    println!("✅ Page started with {}", page.observer_name());

    let (dialog, button) = page.mutate(|doc| -> dom::Result<_> {
        let dialog = doc.create_element("div");
        let button = doc.create_element("button");
        doc.append_child(body, dialog)?;
        doc.append_child(dialog, button)?;
        doc.set_attribute(dialog, "id", "dialog")?;
        Ok((dialog, button))
    })?;
    println!("📄 Opened dialog {}", dialog);

    page.on_remove_from_dom(button, move || {
        println!("🗑️  Button {} left the document", button);
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    // Removing the ancestor detaches the button too
    page.mutate(|doc| doc.detach(dialog))?;
    println!("🔄 Closed dialog");

    // Polling needs at least one tick to notice
    tokio::time::sleep(Duration::from_millis(600)).await;

    page.stop().await?;
    println!("✅ Page stopped");

    Ok(())
}
