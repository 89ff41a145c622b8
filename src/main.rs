//! Titlebar demo
//!
//! Builds a titlebar with a sample menu on a headless window, plays a short
//! session of window events and prints the resulting tree as JSON.

use anyhow::{Context, Result};
use log::{info, LevelFilter};
use std::rc::Rc;
use std::time::Duration;

use titlebar::dom::Document;
use titlebar::host::{HeadlessWindow, HostWindow};
use titlebar::scheduler::ManualScheduler;
use titlebar::{Color, Menu, MenuItemDescriptor, Platform, Titlebar, TitlebarOptions};

fn demo_menu() -> Menu {
    let file = Menu::new(vec![
        MenuItemDescriptor::normal("&&New File")
            .with_accelerator("CmdOrCtrl+N")
            .on_click(|_, _, _| info!("New file requested")),
        MenuItemDescriptor::normal("&&Open...").with_accelerator("CmdOrCtrl+O"),
        MenuItemDescriptor::separator(),
        MenuItemDescriptor::checkbox("Auto &&Save", true),
        MenuItemDescriptor::separator(),
        MenuItemDescriptor::normal("E&&xit").on_click(|_, window, _| window.close()),
    ]);
    let view = Menu::new(vec![
        MenuItemDescriptor::radio("&&Light", false).with_id("theme-light"),
        MenuItemDescriptor::radio("&&Dark", true).with_id("theme-dark"),
        MenuItemDescriptor::separator(),
        MenuItemDescriptor::normal("Toggle &&Full Screen").with_role("togglefullscreen"),
    ]);
    let help = Menu::new(vec![MenuItemDescriptor::normal("&&About").with_sublabel("Version info")]);

    Menu::new(vec![
        MenuItemDescriptor::submenu("&&File", file),
        MenuItemDescriptor::submenu("&&View", view),
        MenuItemDescriptor::submenu("&&Help", help),
    ])
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .format_timestamp_millis()
        .init();

    info!("Starting titlebar demo v{}", env!("CARGO_PKG_VERSION"));

    let options = TitlebarOptions::load_or_default()?.with_menu(demo_menu());
    info!("Options loaded");

    let dom = Document::shared();
    {
        let mut doc = dom.borrow_mut();
        doc.set_title("Titlebar Demo");
        let body = doc.body();
        doc.append_new(body, "main.app-content");
    }
    let window = Rc::new(HeadlessWindow::new());
    let scheduler = Rc::new(ManualScheduler::new());

    let titlebar = Titlebar::builder(dom.clone(), window.clone(), scheduler.clone())
        .platform(Platform::current())
        .options(options)
        .build();

    if let Some(menubar) = titlebar.menubar() {
        menubar.open(0);
        scheduler.advance(Duration::from_millis(50));
        menubar.blur();
    }
    window.blur();
    window.focus();
    window.maximize();
    titlebar.update_background(Color::rgb(0xF3, 0xF3, 0xF3));
    titlebar.update_title(Some("Untitled - Titlebar Demo"));

    let nodes = titlebar.nodes().context("titlebar has no nodes")?;
    let snapshot = dom.borrow().snapshot(nodes.titlebar);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    info!("Window maximized: {}", window.is_maximized());

    titlebar.dispose();
    info!("Titlebar demo finished");
    Ok(())
}
