use eframe::egui;

use super::help::draw_help_window;
use super::properties::draw_sanity_window;
use super::{EditorApp, Tool, tool_button};
use crate::render::{PainterSurface, draw_background, draw_diagram, draw_rubber_band};
use crate::sanity;

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        let diagnostics = sanity::check_diagram(&self.diagram);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New").clicked() {
                        self.new_diagram();
                        ui.close_menu();
                    }
                    if ui.button("Open... (⌘O)").clicked() {
                        self.open_json_dialog();
                        ui.close_menu();
                    }
                    if ui.button("Save JSON... (⌘S)").clicked() {
                        self.save_json_dialog();
                        ui.close_menu();
                    }
                    if ui.button("Export SVG... (⌘⇧S)").clicked() {
                        self.save_svg_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.label("Quick save paths:");
                    ui.small("JSON:");
                    if ui.text_edit_singleline(&mut self.settings.file_path).lost_focus() {
                        self.persist_settings();
                    }
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            self.save_to_path();
                            ui.close_menu();
                        }
                        if ui.button("Load").clicked() {
                            self.load_from_path();
                            ui.close_menu();
                        }
                    });
                    ui.small("SVG:");
                    if ui.text_edit_singleline(&mut self.settings.svg_path).lost_focus() {
                        self.persist_settings();
                    }
                    if ui.button("Export").clicked() {
                        self.save_svg_to_path();
                        ui.close_menu();
                    }
                });
                ui.menu_button("Edit", |ui| {
                    if ui
                        .add_enabled(self.history.can_undo(), egui::Button::new("Undo (⌘Z)"))
                        .clicked()
                    {
                        self.undo();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.history.can_redo(), egui::Button::new("Redo (⌘⇧Z)"))
                        .clicked()
                    {
                        self.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Select All (⌘A)").clicked() {
                        self.select_all();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(!self.selection.is_empty(), egui::Button::new("Delete"))
                        .clicked()
                    {
                        self.delete_selected();
                        ui.close_menu();
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.button("Zoom In").clicked() {
                        self.view.zoom = (self.view.zoom * 1.25).min(8.0);
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.view.zoom = (self.view.zoom / 1.25).max(0.1);
                        ui.close_menu();
                    }
                    if ui.button("Reset Zoom (100%)").clicked() {
                        self.view.zoom = 1.0;
                        ui.close_menu();
                    }
                    if ui.button("Reset Pan").clicked() {
                        self.view.pan_screen = egui::Vec2::ZERO;
                        ui.close_menu();
                    }
                    if ui.button("Sanity Check").clicked() {
                        self.show_sanity = true;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui
                        .checkbox(&mut self.settings.show_touch_bounds, "Show touch areas")
                        .changed()
                    {
                        self.persist_settings();
                    }
                    ui.horizontal(|ui| {
                        ui.label("Grid:");
                        if ui
                            .add(
                                egui::DragValue::new(&mut self.settings.grid_size)
                                    .range(8.0..=256.0)
                                    .speed(1.0),
                            )
                            .changed()
                        {
                            self.persist_settings();
                        }
                    });
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("Show Help (F1)").clicked() {
                        self.show_help = true;
                        ui.close_menu();
                    }
                    if ui.button("Reload Settings").clicked() {
                        self.reload_settings();
                        ui.close_menu();
                    }
                });
                ui.separator();
                tool_button(ui, "⬚ Select", Tool::Select, &mut self.tool);
                tool_button(ui, "▭ Class", Tool::Class, &mut self.tool);
                tool_button(ui, "⌇ Association", Tool::Association, &mut self.tool);
                tool_button(ui, "✋ Pan", Tool::Pan, &mut self.tool);
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.status {
                    Some(status) => ui.label(status),
                    None => ui.label("Ready"),
                };
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Zoom: {:.0}%", self.view.zoom * 100.0));
                    ui.separator();
                    if ui
                        .link(format!("Issues: {}", diagnostics.len()))
                        .clicked()
                    {
                        self.show_sanity = true;
                    }
                    ui.separator();
                    ui.label(format!("Objects: {}", self.diagram.elements().len()));
                    ui.separator();
                    ui.label(format!("Selected: {}", self.selection.len()));
                    ui.separator();
                    ui.label(self.tool.label());
                });
            });
        });

        self.draw_properties_panel(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
            self.handle_canvas(ctx, rect, &response);

            let painter = ui.painter_at(rect);
            draw_background(&painter, rect, &self.view, self.settings.grid_size);
            let mut surface = PainterSurface::new(&painter, self.view, rect.min);
            let selection = &self.selection;
            draw_diagram(
                &mut surface,
                &self.diagram,
                &|item| selection.is_selected(item),
                self.settings.show_touch_bounds,
            );
            if let Some(band) = self.selection.rubber_band() {
                draw_rubber_band(&mut surface, band);
            }
        });

        draw_help_window(ctx, &mut self.show_help);
        draw_sanity_window(ctx, &mut self.show_sanity, &diagnostics);

        // A whole pointer gesture is one undo step.
        if !self.selection.is_pointer_down() {
            // Node ids are only held by the selection, so an empty one may renumber them.
            if self.selection.is_empty() {
                self.diagram.compact_chains();
            }
            self.history.settle(&self.diagram);
        }
    }
}

impl EditorApp {
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let wants_keyboard = ctx.wants_keyboard_input();
        ctx.input_mut(|i| {
            if i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::S) {
                self.save_svg_dialog();
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::S) {
                self.save_json_dialog();
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::O) {
                self.open_json_dialog();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::F1) {
                self.show_help = true;
            }
            if wants_keyboard {
                return;
            }
            if i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
                || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y)
            {
                self.redo();
            } else if i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z) {
                self.undo();
            }
            if i.consume_key(egui::Modifiers::COMMAND, egui::Key::A) {
                self.select_all();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Escape) {
                self.tool = Tool::Select;
                self.tool_before_pan = None;
                self.selection.clear();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::Delete)
                || i.consume_key(egui::Modifiers::NONE, egui::Key::Backspace)
            {
                self.delete_selected();
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::V) {
                self.tool = Tool::Select;
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::C) {
                self.tool = Tool::Class;
            }
            if i.consume_key(egui::Modifiers::NONE, egui::Key::A) {
                self.tool = Tool::Association;
            }
        });
    }

    fn handle_canvas(&mut self, ctx: &egui::Context, rect: egui::Rect, response: &egui::Response) {
        let origin = rect.min;

        // The release may have happened outside the window or after focus was lost.
        let primary_down = ctx.input(|i| i.pointer.primary_down());
        self.selection.release_if_button_up(&mut self.diagram, primary_down);

        let space_down =
            ctx.input(|i| i.key_down(egui::Key::Space)) && !ctx.wants_keyboard_input();
        if space_down {
            if self.tool_before_pan.is_none() {
                self.tool_before_pan = Some(self.tool);
                self.tool = Tool::Pan;
            }
        } else if let Some(prev) = self.tool_before_pan.take() {
            if self.tool == Tool::Pan {
                self.tool = prev;
            }
        }

        let scroll_delta = ctx.input(|i| i.raw_scroll_delta.y);
        if scroll_delta.abs() > 0.0 {
            if let Some(hover_pos) = ctx.input(|i| i.pointer.hover_pos()) {
                if rect.contains(hover_pos) {
                    let zoom_delta = (1.0 + scroll_delta * 0.001).clamp(0.8, 1.25);
                    self.view.zoom_about_screen_point(origin, hover_pos, zoom_delta);
                }
            }
        }

        if self.tool == Tool::Pan {
            if response.dragged() {
                self.view.pan_screen += response.drag_delta();
            }
            return;
        }

        let Some(pointer) = ctx.input(|i| i.pointer.interact_pos()) else {
            return;
        };
        let world = self.view.screen_to_world(origin, pointer);
        let (pressed, released, delta, multi) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.delta(),
                i.modifiers.shift || i.modifiers.command,
            )
        });
        let pressed = pressed && response.hovered();

        match self.tool {
            Tool::Select => {
                if pressed {
                    self.selection
                        .pointer_down(&mut self.diagram, world, multi, &mut self.history);
                }
                if delta != egui::Vec2::ZERO && self.selection.is_pointer_down() {
                    self.selection.pointer_move(
                        &mut self.diagram,
                        world,
                        delta / self.view.zoom,
                        &mut self.history,
                    );
                }
                if released {
                    self.selection.pointer_up(&mut self.diagram, world);
                }
            }
            Tool::Class if pressed => {
                self.place_class(world);
                self.tool = Tool::Select;
            }
            Tool::Association if pressed => {
                self.place_association(world);
                self.tool = Tool::Select;
            }
            _ => {}
        }
    }
}
