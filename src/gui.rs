// src/gui.rs
use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Plot};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use crate::config::PanelConfig;
use crate::dac::{ChannelBank, CHANNEL_COUNT, SHUTTER_CHANNELS, SHUTTER_COUNT};
use crate::types::*;

const DATA_EXTENSION: &str = "dat";
const LOG_CAPACITY: usize = 200;

pub struct PanelApp {
    bank: ChannelBank,
    events: Receiver<BankEvent>,

    // settings (stored when the data file changes and on exit)
    config: PanelConfig,
    config_path: PathBuf,

    // pending offsets typed into the bias / compensation fields
    bias: [f64; BiasGroup::ALL.len()],
    compensation: [f64; Compensation::ALL.len()],

    log_messages: Vec<String>,
}

impl PanelApp {
    pub fn new(config: PanelConfig, config_path: PathBuf) -> Self {
        let mut bank = ChannelBank::new(config.data_file.clone());
        let events = bank.subscribe();
        let data_file = config.data_file.clone();
        let mut app = Self {
            bank,
            events,
            config,
            config_path,
            bias: [0.0; BiasGroup::ALL.len()],
            compensation: [0.0; Compensation::ALL.len()],
            log_messages: vec!["AD5372 panel ready.".to_owned()],
        };
        app.load(Some(data_file));
        app
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > LOG_CAPACITY {
            self.log_messages.remove(0);
        }
    }

    fn remember_data_file(&mut self) {
        self.config.data_file = self.bank.data_file().to_path_buf();
        self.store_config();
    }

    fn store_config(&self) {
        if let Err(err) = self.config.store(&self.config_path) {
            warn!("{err:#}");
        }
    }

    // `None` reloads the current data file, as when the picker is cancelled
    fn load(&mut self, path: Option<PathBuf>) {
        let result = match path {
            Some(path) => self.bank.load_from(path),
            None => self.bank.reload(),
        };
        match result {
            Ok(()) => {
                let msg = format!("Loaded {}", self.bank.data_file().display());
                self.log(&msg);
                self.remember_data_file();
            }
            Err(err) => {
                warn!("load failed: {err}");
                self.log(&format!("Load failed: {err}"));
            }
        }
    }

    fn save(&mut self, path: Option<PathBuf>) {
        let result = match path {
            Some(path) => self.bank.save_to(with_data_extension(&path)),
            None => self.bank.save(),
        };
        match result {
            Ok(()) => {
                let msg = format!("Saved {}", self.bank.data_file().display());
                self.log(&msg);
                self.remember_data_file();
            }
            Err(err) => {
                warn!("save failed: {err}");
                self.log(&format!("Save failed: {err}"));
            }
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            // channel values are read straight from the bank every frame
            if let BankEvent::ShutterChanged { shutter, open } = event {
                let msg = format!(
                    "Shutter {}: {}",
                    self.config.shutter_labels[shutter],
                    if open { "ON" } else { "OFF" }
                );
                self.log(&msg);
            }
        }
    }

    // out-of-range values are shown as they are; only the hardware write refuses them
    fn channel_field(&mut self, ui: &mut egui::Ui, index: usize) {
        let stored = self.bank.values()[index];
        let mut value = stored;
        let drag = egui::DragValue::new(&mut value)
            .speed(0.001)
            .fixed_decimals(self.config.decimals);
        // shutter channels only move through their buttons
        let editable = !SHUTTER_CHANNELS.contains(&index);
        let response = ui
            .add_enabled(editable, drag)
            .on_hover_text(format!("Channel {}", index + 1));
        if response.changed() && value != stored {
            if let Err(err) = self.bank.set_value(index, value) {
                self.log(&err.to_string());
            }
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Reset Board").clicked() {
                self.bank.reset();
                self.log("Board reset to 0 V.");
            }
            if ui.button("Load Data").clicked() {
                let picked = rfd::FileDialog::new()
                    .add_filter("Data File", &[DATA_EXTENSION])
                    .pick_file();
                self.load(picked);
            }
            if ui.button("Save Data").clicked() {
                let picked = rfd::FileDialog::new()
                    .add_filter("Data File", &[DATA_EXTENSION])
                    .save_file();
                self.save(picked);
            }
            ui.separator();
            ui.label(RichText::new(self.bank.data_file().display().to_string()).monospace());
        });
    }

    fn draw_dc_channels(&mut self, ui: &mut egui::Ui) {
        ui.heading("DC Channels");
        egui::Grid::new("dc_channels").striped(true).show(ui, |ui| {
            for (slot, group) in BiasGroup::ALL.into_iter().enumerate() {
                ui.label(match group {
                    BiasGroup::Up => "DC UpUp",
                    BiasGroup::Down => "DC Down",
                });
                for index in group.channels() {
                    ui.label(format!("{}", index + 1));
                    self.channel_field(ui, index);
                }
                ui.label(group.label());
                ui.add(egui::DragValue::new(&mut self.bias[slot]).speed(0.001).fixed_decimals(4));
                if ui.button("Apply").clicked() {
                    self.bank.apply_bias(group, self.bias[slot]);
                    let msg = format!("{} {:+.4} V", group.label(), self.bias[slot]);
                    self.log(&msg);
                }
                ui.end_row();
            }
            ui.label("RF UpUp");
            ui.label(format!("{}", RF_UP_CHANNEL + 1));
            self.channel_field(ui, RF_UP_CHANNEL);
            ui.label("RF Down");
            ui.label(format!("{}", RF_DOWN_CHANNEL + 1));
            self.channel_field(ui, RF_DOWN_CHANNEL);
            ui.end_row();
        });
    }

    fn draw_compensation(&mut self, ui: &mut egui::Ui) {
        ui.heading("Compensation");
        ui.horizontal(|ui| {
            ui.label("Ratio");
            ui.add(
                egui::DragValue::new(&mut self.config.compensation_ratio)
                    .speed(0.01)
                    .fixed_decimals(2)
                    .clamp_range(0.0..=50.0),
            );
        });
        egui::Grid::new("compensation").show(ui, |ui| {
            for (slot, kind) in Compensation::ALL.into_iter().enumerate() {
                ui.label(kind.label());
                ui.add(
                    egui::DragValue::new(&mut self.compensation[slot])
                        .speed(0.0001)
                        .fixed_decimals(4)
                        .clamp_range(-1.0..=1.0),
                );
                if ui.button("GO").clicked() {
                    let (amount, ratio) = (self.compensation[slot], self.config.compensation_ratio);
                    self.bank.apply_compensation(kind, amount, ratio);
                    self.log(&format!("{} {:+.4} V (ratio {:.2})", kind.label(), amount, ratio));
                }
                if slot % 4 == 3 {
                    ui.end_row();
                }
            }
        });
    }

    fn draw_shutters(&mut self, ui: &mut egui::Ui) {
        ui.heading("Shutters");
        ui.horizontal(|ui| {
            for shutter in 0..SHUTTER_COUNT {
                let open = self.bank.shutter_open(shutter).unwrap_or(false);
                let (text, fill) = if open {
                    ("ON", Color32::from_rgb(0, 140, 0))
                } else {
                    ("OFF", Color32::from_rgb(170, 0, 0))
                };
                ui.label(self.config.shutter_labels[shutter].as_str());
                let button = egui::Button::new(RichText::new(text).strong().color(Color32::WHITE))
                    .fill(fill)
                    .min_size(egui::vec2(48.0, 0.0));
                if ui.add(button).clicked() {
                    if let Err(err) = self.bank.set_shutter(shutter, !open) {
                        self.log(&err.to_string());
                    }
                }
                self.channel_field(ui, SHUTTER_CHANNELS[shutter]);
                ui.add_space(12.0);
            }
        });
    }

    fn draw_references(&mut self, ui: &mut egui::Ui) {
        ui.heading("DC References");
        let last_shutter = SHUTTER_CHANNELS[SHUTTER_COUNT - 1];
        egui::Grid::new("dc_references").striped(true).show(ui, |ui| {
            for (n, index) in (last_shutter + 1..CHANNEL_COUNT).enumerate() {
                ui.label(format!("{}", index + 1));
                self.channel_field(ui, index);
                if n % 4 == 3 {
                    ui.end_row();
                }
            }
        });
    }

    fn draw_overview(&self, ui: &mut egui::Ui) {
        let bars: Vec<Bar> = self
            .bank
            .values()
            .iter()
            .enumerate()
            .map(|(i, &v)| Bar::new(i as f64 + 1.0, v).width(0.7))
            .collect();
        Plot::new("channel_overview")
            .height(140.0)
            .include_y(-10.0)
            .include_y(10.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name("Volts")
                        .color(Color32::from_rgb(0, 200, 200)),
                );
            });
    }
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.draw_toolbar(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("log")
            .resizable(true)
            .min_height(80.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for m in &self.log_messages {
                            ui.monospace(m);
                        }
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.draw_dc_channels(ui);
                ui.separator();
                self.draw_compensation(ui);
                ui.separator();
                self.draw_shutters(ui);
                ui.separator();
                self.draw_references(ui);
                ui.separator();
                self.draw_overview(ui);
            });
        });

        // shutter corrections may have queued events during this frame
        self.drain_events();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.store_config();
    }
}

fn with_data_extension(path: &Path) -> PathBuf {
    if path.extension().map_or(false, |ext| ext == DATA_EXTENSION) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(DATA_EXTENSION);
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dac::datafile;
    use eframe::App;
    use std::fs;

    fn temp_path(tag: &str, ext: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ad5372_gui_{tag}_{}.{ext}", rand::random::<u64>()))
    }

    fn test_app(tag: &str) -> (PanelApp, PathBuf, PathBuf) {
        let data_file = temp_path(tag, "dat");
        let config_path = temp_path(tag, "json");
        let config = PanelConfig {
            data_file: data_file.clone(),
            ..PanelConfig::default()
        };
        (PanelApp::new(config, config_path.clone()), data_file, config_path)
    }

    fn run_frame(app: &mut PanelApp) {
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                app.draw_dc_channels(ui);
                app.draw_shutters(ui);
                app.draw_references(ui);
            });
        });
    }

    fn cleanup(paths: &[&Path]) {
        for path in paths {
            fs::remove_file(path).ok();
        }
    }

    #[test]
    fn bias_past_range_survives_a_frame() {
        let (mut app, data_file, config_path) = test_app("bias");
        app.bank.set_value(7, 9.0).unwrap();
        app.bank.apply_bias(BiasGroup::Down, 3.0);
        assert_eq!(app.bank.value(7), Some(12.0));
        run_frame(&mut app);
        assert_eq!(app.bank.value(7), Some(12.0));
        cleanup(&[&data_file, &config_path]);
    }

    #[test]
    fn loaded_out_of_range_values_are_not_rewritten() {
        let (mut app, data_file, config_path) = test_app("loaded");
        let mut values = vec![0.0; CHANNEL_COUNT];
        values[0] = -11.5;
        values[3] = 10.25;
        values[20] = 12.0;
        datafile::write_values(&data_file, &values).unwrap();
        app.load(None);
        let rx = app.bank.subscribe();
        run_frame(&mut app);
        assert_eq!(app.bank.values().as_slice(), values.as_slice());
        assert_eq!(rx.try_iter().count(), 0);
        cleanup(&[&data_file, &config_path]);
    }

    #[test]
    fn exit_stores_edited_ratio() {
        let (mut app, data_file, config_path) = test_app("exit");
        app.config.compensation_ratio = 7.5;
        app.on_exit(None);
        let stored = PanelConfig::load(&config_path).unwrap();
        assert_eq!(stored.compensation_ratio, 7.5);
        assert_eq!(stored.data_file, data_file);
        cleanup(&[&data_file, &config_path]);
    }

    #[test]
    fn save_path_gets_dat_extension() {
        assert_eq!(with_data_extension(Path::new("trap")), PathBuf::from("trap.dat"));
        assert_eq!(with_data_extension(Path::new("trap.dat")), PathBuf::from("trap.dat"));
        assert_eq!(
            with_data_extension(Path::new("runs/trap.v2")),
            PathBuf::from("runs/trap.v2.dat")
        );
    }
}
