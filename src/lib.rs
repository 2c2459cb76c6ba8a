#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

use std::{sync::mpsc::Receiver, time::Duration};

use eframe::egui::{
    self, CentralPanel, Color32, Frame, Image, Layout, ScrollArea, TopBottomPanel, Window,
};

use notifier::Fired;
use reminder_edit::{render_card, CardAction, TimeEditor};
use store::ReminderStore;

pub mod config;
pub mod notifier;
pub mod reminder;

/// implementation of reminder cards and editing for egui
pub mod reminder_edit;
pub mod scheduler;
pub mod store;

pub struct App {
    store: ReminderStore,
    fired: Receiver<Fired>,
    /// fired reminders still waiting to be dismissed
    ringing: Vec<Fired>,
    time_editor: Option<TimeEditor>,
    in_settings: bool,
}

impl App {
    #[must_use]
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        store: ReminderStore,
        fired: Receiver<Fired>,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        Self {
            store,
            fired,
            ringing: vec![],
            time_editor: None,
            in_settings: false,
        }
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("title_and_ctrl").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("ReMind");
                ui.with_layout(Layout::right_to_left(eframe::emath::Align::Min), |ui| {
                    if ui.button("⚙").on_hover_text("settings").clicked() {
                        self.in_settings = true;
                    }
                    if ui.button("+").on_hover_text("add reminder").clicked() {
                        self.store.add();
                    }
                });
            });
        });
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        let mut open = self.in_settings;
        Window::new("settings ⚙").open(&mut open).show(ctx, |ui| {
            let mut use_24_hour = self.store.config().use_24_hour;
            if ui.checkbox(&mut use_24_hour, "24-hour time").changed() {
                self.store.set_use_24_hour(use_24_hour);
            }
            let mut strict_default = self.store.config().strict_default;
            if ui
                .checkbox(&mut strict_default, "new reminders exact by default")
                .changed()
            {
                self.store.set_strict_default(strict_default);
            }
            ui.separator();
            ui.horizontal(|ui| {
                let mut background = self.store.config().background_color;
                if ui.color_edit_button_rgb(&mut background).changed() {
                    self.store.set_background_color(background);
                }
                ui.label("background color");
            });
            ui.horizontal(|ui| {
                let mut text = self.store.config().text_color;
                if ui.color_edit_button_rgb(&mut text).changed() {
                    self.store.set_text_color(text);
                }
                ui.label("text color");
            });
            ui.separator();
            ui.horizontal(|ui| {
                let has_image = self.store.config().background_image.is_some();
                let label = if has_image {
                    "change background image"
                } else {
                    "add background image"
                };
                if ui.button(label).clicked() {
                    if let Some(picked) = pick_image() {
                        self.store.set_background_image(Some(picked));
                    }
                }
                if has_image && ui.button("remove").clicked() {
                    self.store.set_background_image(None);
                }
            });
            ui.separator();
            ui.horizontal(|ui| {
                ui.label(format!("{} triggers pending", self.store.pending().len()));
                if ui.button("reschedule all").clicked() {
                    self.store.reschedule_all();
                }
            });
        });
        self.in_settings = open;
    }

    fn render_ringing(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.fired.try_recv() {
            self.ringing.push(event);
        }
        self.ringing.retain(|event| {
            let mut keep = true;
            // no title by design, just the message
            Window::new("")
                .id(egui::Id::new(("fired", event.id)))
                .auto_sized()
                .show(ctx, |ui| {
                    ui.label(&event.message);
                    if ui.button("dismiss").clicked() {
                        keep = false;
                    }
                });
            keep
        });
    }
}

fn pick_image() -> Option<std::path::PathBuf> {
    let file_dialog = rfd::FileDialog::new()
        .set_title("Pick background image")
        .add_filter("images", &["png", "jpg", "jpeg"]);
    let file_dialog = match directories::UserDirs::new()
        .and_then(|user| user.picture_dir().map(std::path::Path::to_path_buf))
    {
        Some(pictures) => file_dialog.set_directory(pictures),
        None => file_dialog,
    };
    file_dialog.pick_file()
}

fn color32(rgb: [f32; 3]) -> Color32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let [r, g, b] = rgb.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // keep ticking so fired events surface without user input
        ctx.request_repaint_after(Duration::from_millis(500));

        self.render_header(ctx);
        if self.in_settings {
            self.render_settings(ctx);
        }
        self.render_ringing(ctx);

        let mut actions: Vec<CardAction> = vec![];
        let fill = color32(self.store.config().background_color);
        let text = color32(self.store.config().text_color);
        let background_image = self.store.config().background_image.clone();
        let use_24_hour = self.store.config().use_24_hour;
        CentralPanel::default()
            .frame(Frame::default().fill(fill).inner_margin(12.0))
            .show(ctx, |ui| {
                if let Some(path) = &background_image {
                    Image::from_uri(format!("file://{}", path.display()))
                        .paint_at(ui, ui.max_rect());
                }
                ui.visuals_mut().override_text_color = Some(text);
                ScrollArea::vertical().show(ui, |ui| {
                    for reminder in self.store.reminders() {
                        render_card(
                            reminder,
                            use_24_hour,
                            ui,
                            &mut actions,
                            &mut self.time_editor,
                        );
                        ui.add_space(8.0);
                    }
                });
            });

        if let Some(editor) = &mut self.time_editor {
            if !editor.show(ctx, &mut actions) {
                self.time_editor = None;
            }
        }

        // now that the render pass is over, let the actions hit the store
        for action in actions {
            match action {
                CardAction::Edit(id, edit) => self.store.edit(id, edit),
                CardAction::Delete(id) => {
                    if self.time_editor.as_ref().is_some_and(|editor| editor.id == id) {
                        self.time_editor = None;
                    }
                    self.store.delete(id);
                }
            }
        }
    }
}
