//! Smooth scroll example - bring a list item into place inside a panel

use dom::{DomArena, DomRect, ScrollMetrics, Viewport};
use page::{Page, PageConfig};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = PageConfig {
        viewport_throttle_ms: 100,
        ..PageConfig::default()
    };
    let page = Page::new(config, DomArena::with_document(Viewport::new(800.0, 600.0)));

    // Report settled viewport state
    let mut viewport_rx = page.viewport_changes().stream();
    tokio::spawn(async move {
        while let Ok(event) = viewport_rx.recv().await {
            println!(
                "📐 Viewport {:?}: {}x{} at y={}",
                event.trigger, event.viewport.width, event.viewport.height, event.viewport.scroll_y
            );
        }
    });

    // A 400px panel holding 40 rows of 50px
    let rows = page.mutate(|doc| -> dom::Result<Vec<_>> {
        let body = doc.body().ok_or(dom::DomError::NoRoot)?;
        let panel = doc.create_element("div");
        doc.append_child(body, panel)?;
        doc.set_style(panel, "overflow-y", "auto")?;
        doc.set_rect(panel, DomRect::new(0.0, 100.0, 400.0, 400.0))?;
        doc.set_scroll_metrics(panel, ScrollMetrics::new(2000.0, 400.0))?;

        let mut rows = Vec::with_capacity(40);
        for i in 0..40 {
            let row = doc.create_element("li");
            doc.append_child(panel, row)?;
            doc.set_attribute(row, "id", &format!("row-{}", i))?;
            doc.set_rect(row, DomRect::new(0.0, 100.0 + i as f64 * 50.0, 400.0, 50.0))?;
            rows.push(row);
        }
        Ok(rows)
    })?;

    page.mark_ready();
    page.start().await?;

    let target = page.find_by_id("row-25", None).ok_or("row-25 not found")?;
    page.add_class(Some(target), "highlighted");
    println!("🎯 Scrolling to row-25 (node {}) of {}", target, rows.len());

    if page.scroll_by_element_to_with(target, 20.0, Duration::from_millis(300)) {
        tokio::time::sleep(Duration::from_millis(400)).await;
    }

    let rect = page.read(|doc| doc.get(target).map(|node| node.rect))?;
    println!("✅ row-25 now at y={} (panel top 100 + 20)", rect.y);
    println!("👀 In viewport: {}", page.is_in_viewport(Some(target), true));

    // A burst of window signals collapses into one event
    page.resize(1024.0, 768.0);
    page.resize(1280.0, 720.0);
    tokio::time::sleep(Duration::from_millis(200)).await;

    page.stop().await?;
    Ok(())
}
