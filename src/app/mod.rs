use std::cell::Cell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow, PolicyType, ScrolledWindow, TextView, WrapMode};

use crate::config::{load_menu_config, MenuConfig};
use crate::document::{EditorEvent, EditorHost, TextViewHost};
use crate::error::{AppError, AppResult};
use crate::menu::{
    ControllerOptions, FloatingMenuController, GioLinkOpener, GtkMenuElement, LinkActions,
    MarkTarget, MenuParts,
};
use crate::popover::GtkPopoverFactory;
use crate::schedule::GlibTimers;
use crate::ui::{LinkMenuView, StyleTokens, LAYOUT_TOKENS};

mod runtime_css;
mod sample;

use self::runtime_css::install_runtime_css;
use self::sample::sample_content;

const APPLICATION_ID: &str = "io.github.markmenu.Demo";

type EditorLinkActions = LinkActions<TextViewHost>;

/// Demo window: a text view with a couple of links and the floating link menu.
pub struct App {
    config: MenuConfig,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(load_menu_config())
    }

    pub fn with_config(config: MenuConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn start(&self) -> AppResult<gtk4::glib::ExitCode> {
        gtk4::init().map_err(AppError::GtkInit)?;
        tracing::info!(
            update_delay_ms = self.config.update_delay_ms,
            placement = ?self.config.popover.placement,
            "starting gtk runtime"
        );

        let application = Application::new(
            Some(APPLICATION_ID),
            gtk4::gio::ApplicationFlags::NON_UNIQUE,
        );
        let config = self.config.clone();
        let activate_once = Rc::new(Cell::new(false));
        application.connect_activate(move |app| {
            if activate_once.replace(true) {
                tracing::debug!("ignoring duplicate gtk activate signal");
                return;
            }
            if let Err(err) = build_editor_window(app, &config, LAYOUT_TOKENS) {
                tracing::error!(%err, "failed to build editor window");
                app.quit();
            }
        });

        // Only argv[0] goes to GTK.
        let gtk_args: Vec<String> = std::env::args().take(1).collect();
        Ok(application.run_with_args(&gtk_args))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn build_editor_window(
    app: &Application,
    config: &MenuConfig,
    tokens: StyleTokens,
) -> AppResult<()> {
    install_runtime_css(tokens);

    let window = ApplicationWindow::new(app);
    window.set_title(Some("markmenu"));
    window.set_default_size(tokens.window_default_width, tokens.window_default_height);

    let (text, links) = sample_content();
    let view = TextView::new();
    view.add_css_class("markmenu-editor");
    view.set_wrap_mode(WrapMode::Word);
    view.set_left_margin(tokens.editor_margin);
    view.set_right_margin(tokens.editor_margin);
    view.set_top_margin(tokens.editor_margin);
    view.set_bottom_margin(tokens.editor_margin);
    view.buffer().set_text(&text);

    let scroller = ScrolledWindow::new();
    scroller.set_hscrollbar_policy(PolicyType::Never);
    scroller.set_child(Some(&view));
    window.set_child(Some(&scroller));

    let host = Rc::new(TextViewHost::new(&view));
    for link in &links {
        host.add_link(link.start, link.end, link.href);
    }

    let menu_view = Rc::new(LinkMenuView::new(tokens));
    let actions = Rc::new(LinkActions::new(
        host.clone(),
        Rc::new(GioLinkOpener),
        MarkTarget::from_config(config),
    ));
    let controller = Rc::new(FloatingMenuController::new(
        MenuParts {
            host: host.clone(),
            menu: Rc::new(GtkMenuElement::new(menu_view.root())),
            popovers: Rc::new(GtkPopoverFactory::new(menu_view.root())),
            timers: Rc::new(GlibTimers::new()),
        },
        ControllerOptions::from_config(config),
    )?);

    wire_link_actions(&host, &actions, &menu_view, &view);

    {
        let controller = controller.clone();
        scroller
            .vadjustment()
            .connect_value_changed(move |_| controller.reposition());
    }
    window.connect_close_request(move |_| {
        controller.destroy();
        host.detach();
        gtk4::glib::Propagation::Proceed
    });

    tracing::info!(links = links.len(), "presenting editor window");
    window.present();
    Ok(())
}

fn render_menu(actions: &EditorLinkActions, menu_view: &LinkMenuView) {
    actions.with_content(|content| menu_view.render(content));
}

fn wire_link_actions(
    host: &Rc<TextViewHost>,
    actions: &Rc<EditorLinkActions>,
    menu_view: &Rc<LinkMenuView>,
    view: &TextView,
) {
    render_menu(actions, menu_view);

    {
        // Weak: the actions own the host.
        let actions = Rc::downgrade(actions);
        let menu_view = menu_view.clone();
        host.subscribe(Rc::new(move |event: &EditorEvent<gtk4::Widget>| {
            if !matches!(event, EditorEvent::SelectionChanged) {
                return;
            }
            if let Some(actions) = actions.upgrade() {
                actions.sync_selection();
                render_menu(&actions, &menu_view);
            }
        }));
    }

    {
        let actions = actions.clone();
        let menu_view_for_click = menu_view.clone();
        menu_view.edit_button().connect_clicked(move |_| {
            if let Err(err) = actions.edit() {
                tracing::warn!(%err, "could not start editing link");
                return;
            }
            render_menu(&actions, &menu_view_for_click);
            menu_view_for_click.entry().grab_focus();
        });
    }

    {
        let actions = actions.clone();
        menu_view.open_button().connect_clicked(move |_| match actions.open() {
            Ok(true) => {}
            Ok(false) => tracing::debug!("open requested without a link target"),
            Err(err) => tracing::warn!(%err, "failed to open link"),
        });
    }

    {
        let actions = actions.clone();
        menu_view.entry().connect_changed(move |entry| {
            if !actions.mode().is_editing() {
                return;
            }
            if let Err(err) = actions.update_draft(entry.text().as_str()) {
                tracing::warn!(%err, "failed to update link draft");
            }
        });
    }

    let confirm = {
        let actions = actions.clone();
        let menu_view = menu_view.clone();
        let view = view.clone();
        Rc::new(move || {
            if let Err(err) = actions.confirm() {
                tracing::warn!(%err, "failed to apply link");
                return;
            }
            render_menu(&actions, &menu_view);
            view.grab_focus();
        })
    };
    {
        let confirm = confirm.clone();
        menu_view
            .confirm_button()
            .connect_clicked(move |_| confirm());
    }
    menu_view.entry().connect_activate(move |_| confirm());

    {
        let actions = actions.clone();
        let menu_view_for_click = menu_view.clone();
        let view = view.clone();
        menu_view.cancel_button().connect_clicked(move |_| {
            if let Err(err) = actions.cancel() {
                tracing::warn!(%err, "failed to cancel link edit");
            }
            render_menu(&actions, &menu_view_for_click);
            view.grab_focus();
        });
    }
}
