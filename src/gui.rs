// src/gui.rs
use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;

use crate::capture::series::Traces;
use crate::capture::CancelToken;
use crate::config::AcqConfig;
use crate::types::{AcqMessage, SourceKind};
use crate::worker;

pub struct StepScopeApp {
    config: AcqConfig,
    source_kind: SourceKind,

    // plot state
    traces: Traces,
    run_counter: u32,
    active: Option<ActiveRun>,

    // operator log
    log_messages: Vec<String>,

    // worker channel
    rx: Receiver<AcqMessage>,
    tx: Sender<AcqMessage>,
}

struct ActiveRun {
    run: u32,
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

impl StepScopeApp {
    pub fn new(config: AcqConfig) -> Self {
        let (tx, rx) = channel();
        Self {
            config,
            source_kind: SourceKind::Hardware,
            traces: Traces::default(),
            run_counter: 0,
            active: None,
            log_messages: vec!["stepscope ready.".to_owned()],
            rx,
            tx,
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {msg}"));
        if self.log_messages.len() > 8 {
            self.log_messages.remove(0);
        }
    }

    /// Starts one acquisition worker, unless a run is already live.
    fn start_run(&mut self) {
        if self.active.is_some() {
            log::warn!("run rejected: acquisition already in progress");
            self.log("acquisition already in progress");
            return;
        }
        self.run_counter += 1;
        let cancel = CancelToken::new();
        let handle = worker::spawn_acquisition(
            self.config.clone(),
            self.source_kind,
            cancel.clone(),
            self.tx.clone(),
            self.run_counter,
        );
        self.active = Some(ActiveRun {
            run: self.run_counter,
            cancel,
            handle,
        });
        self.log(&format!("run {} started", self.run_counter));
    }

    fn finish_active(&mut self, run: u32) {
        if self.active.as_ref().is_some_and(|a| a.run == run) {
            if let Some(active) = self.active.take() {
                active.handle.join().ok();
            }
        }
    }

    fn pump_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                AcqMessage::Log(s) => self.log(&s),
                AcqMessage::Finished { run, series } => {
                    self.finish_active(run);
                    if series.is_empty() {
                        self.log(&format!("run {run}: no samples"));
                    } else {
                        self.traces.push(run, series);
                    }
                }
                AcqMessage::Failed { run, reason } => {
                    self.finish_active(run);
                    self.log(&format!("run {run} failed: {reason}"));
                }
            }
        }
    }
}

impl eframe::App for StepScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. worker feedback
        self.pump_messages();
        if self.active.is_some() {
            ctx.request_repaint();
        }

        // 2. controls
        egui::SidePanel::left("controls").min_width(240.0).show(ctx, |ui| {
            ui.add_space(10.0);
            ui.heading("Step Response");
            ui.label("Motor telemetry console");
            ui.separator();

            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.source_kind, SourceKind::Simulation, "SIM");
                ui.selectable_value(&mut self.source_kind, SourceKind::Hardware, "REAL");
            });

            ui.horizontal(|ui| {
                ui.label("Port");
                ui.text_edit_singleline(&mut self.config.port_name);
            });
            ui.horizontal(|ui| {
                ui.label("Gain");
                ui.add(egui::DragValue::new(&mut self.config.gain).speed(0.0005));
            });
            ui.horizontal(|ui| {
                ui.label("Setpoint");
                ui.add(egui::DragValue::new(&mut self.config.setpoint).speed(100.0));
            });

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Run Test").clicked() {
                    self.start_run();
                }
                if ui.button("Clear").clicked() {
                    self.traces.clear();
                }
                if ui.button("Quit").clicked() {
                    if let Some(active) = &self.active {
                        active.cancel.cancel();
                    }
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            if self.active.is_some() {
                ui.label("acquiring...");
            }

            ui.add_space(10.0);
            egui::ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
        });

        // 3. plot surface
        egui::CentralPanel::default().show(ctx, |ui| {
            Plot::new("step_plot")
                .x_axis_label(self.config.x_label.clone())
                .y_axis_label(self.config.y_label.clone())
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    for (run, series) in self.traces.iter() {
                        plot_ui.line(
                            Line::new(PlotPoints::new(series.points()))
                                .name(format!("Run {run}")),
                        );
                    }
                });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Window-manager close is as safe as the Quit button.
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            active.handle.join().ok();
        }
    }
}
