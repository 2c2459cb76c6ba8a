use eframe::egui::{self, Button, RichText, TextEdit, Widget, Window};
use uuid::Uuid;

use crate::reminder::{format_hour, Reminder, ReminderEdit, Sound};

/// what a card's controls asked the store to do this frame. collected during
/// the render pass and applied afterwards, so nothing mutates the store
/// while it's being drawn
#[derive(Debug, Clone, PartialEq)]
pub enum CardAction {
    Edit(Uuid, ReminderEdit),
    Delete(Uuid),
}

pub fn render_card(
    reminder: &Reminder,
    use_24_hour: bool,
    ui: &mut egui::Ui,
    actions: &mut Vec<CardAction>,
    open_editor: &mut Option<TimeEditor>,
) {
    ui.push_id(reminder.id, |ui| {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                let shown = format_hour(reminder.target_hour, use_24_hour);
                // ~ marks a loose reminder whose real fire time may differ
                let shown = if reminder.strict {
                    shown
                } else {
                    format!("~{shown}")
                };
                if ui
                    .add(Button::new(RichText::new(shown).size(32.0)).frame(false))
                    .on_hover_text("set time")
                    .clicked()
                {
                    *open_editor = Some(TimeEditor::new(reminder));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("x").on_hover_text("delete reminder").clicked() {
                        actions.push(CardAction::Delete(reminder.id));
                    }
                });
            });
            let mut message = reminder.message.clone();
            if ui
                .add(
                    TextEdit::singleline(&mut message)
                        .hint_text("Enter message...")
                        .desired_width(f32::INFINITY),
                )
                .changed()
            {
                actions.push(CardAction::Edit(reminder.id, ReminderEdit::Message(message)));
            }
        });
    });
}

/// scratch state for the one open time/strictness/sound editor window
pub struct TimeEditor {
    pub id: Uuid,
    hour: u8,
    minute: u8,
    hour_string: String,
    minute_string: String,
    strict: bool,
    sound: String,
}

impl TimeEditor {
    #[must_use]
    pub fn new(reminder: &Reminder) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let total_minutes = (reminder.target_hour * 60.0).round() as i64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (hour, minute) = (((total_minutes / 60) % 24) as u8, (total_minutes % 60) as u8);
        Self {
            id: reminder.id,
            hour,
            minute,
            hour_string: hour.to_string(),
            minute_string: minute.to_string(),
            strict: reminder.strict,
            sound: reminder.sound.clone(),
        }
    }

    fn target_hour(&self) -> f64 {
        f64::from(self.hour) + f64::from(self.minute) / 60.0
    }

    fn push_time(&self, actions: &mut Vec<CardAction>) {
        actions.push(CardAction::Edit(
            self.id,
            ReminderEdit::Time(self.target_hour()),
        ));
    }

    /// returns false once the editor was closed
    pub fn show(&mut self, ctx: &egui::Context, actions: &mut Vec<CardAction>) -> bool {
        let mut open = true;
        Window::new("set time").id(egui::Id::new(self.id)).show(ctx, |ui| {
            ui.horizontal(|ui| {
                self.hour_selector(ui, actions);
                self.minute_selector(ui, actions);
            });
            ui.horizontal(|ui| {
                let was_strict = self.strict;
                ui.selectable_value(&mut self.strict, false, "loose");
                ui.selectable_value(&mut self.strict, true, "exact");
                if was_strict != self.strict {
                    actions.push(CardAction::Edit(self.id, ReminderEdit::Strict(self.strict)));
                }
            });
            ui.label(if self.strict {
                "fires at the exact time"
            } else {
                "fires within ±15 minutes of the set time"
            });
            ui.separator();
            self.sound_selector(ui, actions);
            if ui.button("done").clicked() {
                open = false;
            }
        });
        open
    }

    fn hour_selector(&mut self, ui: &mut egui::Ui, actions: &mut Vec<CardAction>) {
        ui.vertical(|ui| {
            ui.label("Hour");
            if ui.button("Up").clicked() && self.hour < 23 {
                self.hour += 1;
                self.hour_string = self.hour.to_string();
                self.push_time(actions);
            }
            if TextEdit::singleline(&mut self.hour_string)
                .desired_width(20.0)
                .char_limit(2)
                .ui(ui)
                .lost_focus()
            {
                // if the input value is valid, update the value
                if let Ok(parsed) = self.hour_string.parse::<u8>() {
                    self.hour = parsed.clamp(0, 23);
                    self.push_time(actions);
                }
                // sync the input value and the value regardless
                self.hour_string = self.hour.to_string();
            }
            if ui.button("Down").clicked() && self.hour > 0 {
                self.hour -= 1;
                self.hour_string = self.hour.to_string();
                self.push_time(actions);
            }
        });
    }

    fn minute_selector(&mut self, ui: &mut egui::Ui, actions: &mut Vec<CardAction>) {
        ui.vertical(|ui| {
            ui.label("Minute");
            if ui.button("Up").clicked() && self.minute < 59 {
                self.minute += 1;
                self.minute_string = self.minute.to_string();
                self.push_time(actions);
            }
            if TextEdit::singleline(&mut self.minute_string)
                .desired_width(20.0)
                .char_limit(2)
                .ui(ui)
                .lost_focus()
            {
                if let Ok(parsed) = self.minute_string.parse::<u8>() {
                    self.minute = parsed.clamp(0, 59);
                    self.push_time(actions);
                }
                self.minute_string = self.minute.to_string();
            }
            if ui.button("Down").clicked() && self.minute > 0 {
                self.minute -= 1;
                self.minute_string = self.minute.to_string();
                self.push_time(actions);
            }
        });
    }

    fn sound_selector(&mut self, ui: &mut egui::Ui, actions: &mut Vec<CardAction>) {
        ui.label("sound");
        egui::ScrollArea::vertical().max_height(80.0).show(ui, |ui| {
            let names =
                std::iter::once(Sound::default_name()).chain(Sound::catalog().into_iter().map(|sound| sound.name));
            for name in names {
                if ui
                    .selectable_value(&mut self.sound, name.clone(), name.as_str())
                    .changed()
                {
                    actions.push(CardAction::Edit(
                        self.id,
                        ReminderEdit::Sound(self.sound.clone()),
                    ));
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_round_trips_the_target_hour() {
        let reminder = Reminder::new(17.5, "tea", true);
        let editor = TimeEditor::new(&reminder);
        assert_eq!((editor.hour, editor.minute), (17, 30));
        assert_eq!(editor.target_hour(), 17.5);
    }

    #[test]
    fn editor_clamps_to_a_day() {
        let reminder = Reminder::new(23.999, "late", false);
        let editor = TimeEditor::new(&reminder);
        assert_eq!((editor.hour, editor.minute), (0, 0));
    }
}
