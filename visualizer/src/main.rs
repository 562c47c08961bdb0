use chartcore::engine::{
    AggregateOutput, ChartScene, ChartView, DayBucketIndex, EventIngester, InteractionLayer,
    Primitive, Rgba, SceneBuilder, SceneParams, TimeWindowAggregator, TooltipPayload,
    ViewportTransform, VisibilityState,
};
use chartcore::prelude::{validate_period, AggregationMode};
use chartcore::query_interface::{DayKey, QueryRecord};
use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Action, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Event, Length, Point, Rectangle, Renderer, Size, Subscription,
    Task, Theme,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashSet},
    time::Duration,
};

const CHART_HEIGHT: f32 = 440.0;
const DEFAULT_CHART_WIDTH: f32 = 920.0;

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Detection Timeline Visualizer".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(2)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    config: ScenarioForm,
    records: Vec<QueryRecord>,
    selected_models: Vec<String>,
    visibility: VisibilityState,
    period_input: String,
    period_minutes: u32,
    mode: AggregationMode,
    days: Vec<DayKey>,
    aggregate: AggregateOutput,
    scene: ChartScene,
    viewport: ViewportTransform,
    interaction: InteractionLayer,
    hover_position: Option<(f32, f32)>,
    chart_width: f32,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    FeedFetched(Result<FeedPayload, String>),
    PeriodInputChanged(String),
    ApplyPeriod,
    ToggleMode,
    LegendToggled(String),
    ChartZoomed { anchor_x: f32, delta: f32 },
    ChartPanned { delta_x: f32 },
    ChartHovered { x: f32, y: f32 },
    ChartLeft,
    ChartResized { width: f32 },
    ConfigFieldChanged(ConfigField, String),
    SubmitConfig,
    ConfigSubmitted(Result<String, String>),
}

#[derive(Debug, Clone, Copy)]
enum ConfigField {
    Days,
    RecordsPerDay,
    Seed,
    Description,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let chart_width = DEFAULT_CHART_WIDTH;
        (
            Visualizer {
                config: ScenarioForm::default(),
                records: Vec::new(),
                selected_models: Vec::new(),
                visibility: VisibilityState::default(),
                period_input: "60".into(),
                period_minutes: 60,
                mode: AggregationMode::Sum,
                days: Vec::new(),
                aggregate: AggregateOutput::default(),
                scene: ChartScene::default(),
                viewport: ViewportTransform::new(SceneBuilder::inner_width(chart_width)),
                interaction: InteractionLayer::new(),
                hover_position: None,
                chart_width,
                status: "Waiting for records...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_feed(), Message::FeedFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_feed(), Message::FeedFetched),
            Message::FeedFetched(Ok(feed)) => {
                if feed.records != state.records {
                    state.records = feed.records;
                    state.selected_models = distinct_models(&state.records);
                    state.status = format!(
                        "Feed received: {} records / {} models",
                        feed.record_count,
                        state.selected_models.len()
                    );
                    state.push_history(format!("Feed: {} records", state.records.len()));
                    for note in feed.feed_notes {
                        state.push_history(note);
                    }
                    state.recompute_aggregation();
                    state.rebuild_scene();
                }
                Task::none()
            }
            Message::FeedFetched(Err(err)) => {
                state.status = format!("Feed error: {err}");
                Task::none()
            }
            Message::PeriodInputChanged(value) => {
                state.period_input = value;
                Task::none()
            }
            Message::ApplyPeriod => {
                match state.period_input.trim().parse::<u32>() {
                    Ok(period) if validate_period(period).is_ok() => {
                        state.period_minutes = period;
                        state.status = format!("Period set to {} minutes", period);
                        state.recompute_aggregation();
                        state.rebuild_scene();
                    }
                    _ => {
                        state.status = format!(
                            "Invalid period '{}' (must divide 1440)",
                            state.period_input
                        );
                    }
                }
                Task::none()
            }
            Message::ToggleMode => {
                state.mode = match state.mode {
                    AggregationMode::Sum => AggregationMode::Average,
                    AggregationMode::Average => AggregationMode::Sum,
                };
                state.push_history(format!("Mode: {:?}", state.mode));
                state.recompute_aggregation();
                state.rebuild_scene();
                Task::none()
            }
            Message::LegendToggled(model) => {
                let hidden = state.visibility.toggle(ChartView::Aggregated, &model);
                state.push_history(format!(
                    "{} {}",
                    if hidden { "Hidden" } else { "Shown" },
                    model
                ));
                state.recompute_aggregation();
                state.rebuild_scene();
                Task::none()
            }
            Message::ChartZoomed { anchor_x, delta } => {
                let factor = if delta > 0.0 { 1.2 } else { 1.0 / 1.2 };
                state
                    .viewport
                    .zoom_at(anchor_x - chartcore::engine::scene::MARGIN_LEFT, factor);
                state.rebuild_scene();
                Task::none()
            }
            Message::ChartPanned { delta_x } => {
                state.viewport.pan_by(delta_x);
                state.rebuild_scene();
                Task::none()
            }
            Message::ChartHovered { x, y } => {
                state.hover_position = Some((x, y));
                state.interaction.hover(x, y);
                Task::none()
            }
            Message::ChartLeft => {
                state.hover_position = None;
                state.interaction.pointer_left();
                Task::none()
            }
            Message::ChartResized { width } => {
                if (width - state.chart_width).abs() > 1.0 {
                    state.chart_width = width;
                    state
                        .viewport
                        .set_inner_width(SceneBuilder::inner_width(width));
                    state.rebuild_scene();
                }
                Task::none()
            }
            Message::ConfigFieldChanged(field, value) => {
                state.config.update_field(field, value);
                Task::none()
            }
            Message::SubmitConfig => {
                let payload = state.config.to_payload();
                Task::perform(post_config(payload), Message::ConfigSubmitted)
            }
            Message::ConfigSubmitted(Ok(message)) => {
                state.status = message;
                state.push_history("Scenario submitted".into());
                Task::none()
            }
            Message::ConfigSubmitted(Err(err)) => {
                state.status = format!("Config error: {err}");
                Task::none()
            }
        }
    }

    /// Re-runs ingest -> day grouping -> window aggregation. Only data,
    /// mode, period, or visibility changes land here; zoom/pan never does.
    fn recompute_aggregation(&mut self) {
        let hidden: HashSet<String> = self
            .visibility
            .hidden_for(ChartView::Aggregated)
            .clone();
        let ingest =
            EventIngester::new().ingest(&self.records, &self.selected_models, &hidden);
        let index = DayBucketIndex::build(ingest.events);
        self.days = index.days();
        match TimeWindowAggregator::new(self.period_minutes, self.mode) {
            Ok(aggregator) => {
                self.aggregate = aggregator.aggregate(&index);
            }
            Err(err) => {
                self.status = format!("Aggregation error: {err}");
                self.aggregate = AggregateOutput::default();
            }
        }
    }

    /// Relayouts the scene under the current viewport transform.
    fn rebuild_scene(&mut self) {
        let params = SceneParams {
            height: CHART_HEIGHT,
            period_minutes: self.period_minutes,
            selected_models: self.selected_models.clone(),
            hidden_models: self
                .visibility
                .hidden_for(ChartView::Aggregated)
                .clone(),
        };
        let scene =
            SceneBuilder::new().build(&self.days, &self.aggregate, &params, &self.viewport);
        self.interaction.set_scene(scene.hit_targets.clone());
        self.hover_position = None;
        self.scene = scene;
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let saved_count = state.records.iter().filter(|r| r.retains_image()).count();
        let inference_count = state.records.len() - saved_count;

        let mode_label = match state.mode {
            AggregationMode::Sum => "Aggregation: Sum",
            AggregationMode::Average => "Aggregation: Average",
        };

        let legend_buttons = state.scene.legend.iter().fold(
            Column::new().spacing(4),
            |col, entry| {
                let marker = if entry.hidden { "[ ]" } else { "[x]" };
                col.push(
                    button(text(format!("{} {}", marker, entry.model)).size(13))
                        .on_press(Message::LegendToggled(entry.model.clone()))
                        .padding(4),
                )
            },
        );

        let config_column = column![
            text("Chart Controls").size(26),
            text_input("Period (minutes)", &state.period_input)
                .on_input(Message::PeriodInputChanged)
                .padding(6),
            button("Apply period")
                .on_press(Message::ApplyPeriod)
                .padding(8),
            button(mode_label).on_press(Message::ToggleMode).padding(8),
            text("Models").size(16),
            legend_buttons,
            text("Scenario").size(16),
            text_input("Days", &state.config.days)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::Days, value))
                .padding(6),
            text_input("Records per day", &state.config.records_per_day)
                .on_input(|value| {
                    Message::ConfigFieldChanged(ConfigField::RecordsPerDay, value)
                })
                .padding(6),
            text_input("Seed", &state.config.seed)
                .on_input(|value| Message::ConfigFieldChanged(ConfigField::Seed, value))
                .padding(6),
            text_input("Description", &state.config.description)
                .on_input(|value| {
                    Message::ConfigFieldChanged(ConfigField::Description, value)
                })
                .padding(6),
            button("POST scenario")
                .on_press(Message::SubmitConfig)
                .padding(10),
            text(&state.status).size(14),
            column![
                text("Parameter definitions").size(16),
                text("Period: bucket width in minutes; must divide a day evenly.").size(12),
                text("Sum: total detected objects per bucket; Average: objects per event.")
                    .size(12),
                text("Models: click to hide a detector from the aggregation input.").size(12),
                text("Scroll to zoom the time axis, drag to pan, hover a bar for details.")
                    .size(12),
            ]
            .spacing(4)
            .padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(320.0));

        let record_info = if state.records.is_empty() {
            text("Records: n/a").size(18)
        } else {
            text(format!(
                "{} saved images, {} inference-only ({} total records)",
                saved_count,
                inference_count,
                state.records.len()
            ))
            .size(18)
        };

        let chart = Canvas::new(ChartProgram {
            scene: &state.scene,
            tooltip: state.interaction.tooltip(),
            hover_position: state.hover_position,
            known_width: state.chart_width,
        })
        .width(Length::Fill)
        .height(Length::Fixed(CHART_HEIGHT));

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let chart_column = column![
            text("Detection Timeline").size(26),
            record_info,
            chart,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(110.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![config_column, chart_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn distinct_models(records: &[QueryRecord]) -> Vec<String> {
    let mut models = BTreeSet::new();
    for record in records {
        for model in record.models_results.keys() {
            models.insert(model.clone());
        }
    }
    models.into_iter().collect()
}

async fn fetch_feed() -> Result<FeedPayload, String> {
    let response = reqwest::get("http://127.0.0.1:9000/records")
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<FeedPayload>()
        .await
        .map_err(|e| e.to_string())
}

async fn post_config(config: ScenarioConfig) -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post("http://127.0.0.1:9000/ingest-config")
        .json(&config)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok("Scenario submitted".into())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_else(|_| "".into());
        Err(format!("{}: {}", status, text))
    }
}

#[derive(Debug, Clone)]
struct ScenarioForm {
    days: String,
    records_per_day: String,
    seed: String,
    description: String,
}

impl Default for ScenarioForm {
    fn default() -> Self {
        Self {
            days: "3".into(),
            records_per_day: "48".into(),
            seed: "0".into(),
            description: "Rust visualizer scenario".into(),
        }
    }
}

impl ScenarioForm {
    fn update_field(&mut self, field: ConfigField, value: String) {
        match field {
            ConfigField::Days => self.days = value,
            ConfigField::RecordsPerDay => self.records_per_day = value,
            ConfigField::Seed => self.seed = value,
            ConfigField::Description => self.description = value,
        }
    }

    fn to_payload(&self) -> ScenarioConfig {
        ScenarioConfig {
            days: self.days.parse().ok(),
            records_per_day: self.records_per_day.parse().ok(),
            seed: self.seed.parse().ok(),
            description: if self.description.trim().is_empty() {
                None
            } else {
                Some(self.description.clone())
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ScenarioConfig {
    days: Option<usize>,
    records_per_day: Option<usize>,
    seed: Option<u64>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FeedPayload {
    #[serde(default)]
    records: Vec<QueryRecord>,
    #[serde(default)]
    record_count: usize,
    #[serde(default)]
    feed_notes: Vec<String>,
}

fn to_color(rgba: Rgba) -> Color {
    Color::from_rgba(rgba.r, rgba.g, rgba.b, rgba.a)
}

struct ChartProgram<'a> {
    scene: &'a ChartScene,
    tooltip: Option<&'a TooltipPayload>,
    hover_position: Option<(f32, f32)>,
    known_width: f32,
}

#[derive(Default)]
struct ChartState {
    dragging: Option<Point>,
}

impl<'a> canvas::Program<Message> for ChartProgram<'a> {
    type State = ChartState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.04, 0.04, 0.06),
        );

        for primitive in &self.scene.primitives {
            match primitive {
                Primitive::Bar {
                    x,
                    y,
                    width,
                    height,
                    fill,
                } => {
                    frame.fill_rectangle(
                        Point::new(*x, *y),
                        Size::new(*width, *height),
                        to_color(*fill),
                    );
                }
                Primitive::GridLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    stroke,
                    stroke_width,
                } => {
                    let line = Path::new(|builder| {
                        builder.move_to(Point::new(*x1, *y1));
                        builder.line_to(Point::new(*x2, *y2));
                    });
                    frame.stroke(
                        &line,
                        Stroke::default()
                            .with_color(to_color(*stroke))
                            .with_width(*stroke_width),
                    );
                }
                Primitive::Tick { x, y, label, color } => {
                    frame.fill_text(canvas::Text {
                        content: label.clone(),
                        position: Point::new(*x - 34.0, *y - 6.0),
                        color: to_color(*color),
                        size: 10.0.into(),
                        ..Default::default()
                    });
                }
                Primitive::Text {
                    x,
                    y,
                    content,
                    size,
                    color,
                } => {
                    frame.fill_text(canvas::Text {
                        content: content.clone(),
                        position: Point::new(*x, *y),
                        color: to_color(*color),
                        size: (*size).into(),
                        ..Default::default()
                    });
                }
            }
        }

        if let (Some(tooltip), Some((hover_x, hover_y))) = (self.tooltip, self.hover_position) {
            let box_width = 210.0;
            let box_height = 76.0;
            let box_x = (hover_x + 14.0).min(bounds.width - box_width - 4.0);
            let box_y = (hover_y - box_height - 8.0).max(4.0);

            frame.fill_rectangle(
                Point::new(box_x, box_y),
                Size::new(box_width, box_height),
                Color::from_rgba(0.1, 0.1, 0.14, 0.92),
            );
            let lines = [
                format!("{}  {}", tooltip.model, tooltip.day),
                format!("{}  value {:.1}", tooltip.window, tooltip.value),
                format!(
                    "with image: {} events / {} objects",
                    tooltip.with_image_count, tooltip.with_image_objects
                ),
                format!(
                    "inference-only: {} events / {} objects",
                    tooltip.inference_only_count, tooltip.inference_only_objects
                ),
            ];
            for (i, line) in lines.iter().enumerate() {
                frame.fill_text(canvas::Text {
                    content: line.clone(),
                    position: Point::new(box_x + 8.0, box_y + 6.0 + i as f32 * 17.0),
                    color: Color::from_rgb(0.92, 0.92, 0.95),
                    size: 11.0.into(),
                    ..Default::default()
                });
            }
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    state.dragging = Some(position);
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.dragging = None;
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if (bounds.width - self.known_width).abs() > 1.0 {
                    return Some(Action::publish(Message::ChartResized {
                        width: bounds.width,
                    }));
                }
                if let Some(position) = cursor.position_in(bounds) {
                    if let Some(previous) = state.dragging {
                        let delta_x = position.x - previous.x;
                        state.dragging = Some(position);
                        if delta_x != 0.0 {
                            return Some(Action::publish(Message::ChartPanned { delta_x }));
                        }
                    } else {
                        return Some(Action::publish(Message::ChartHovered {
                            x: position.x,
                            y: position.y,
                        }));
                    }
                }
            }
            Event::Mouse(mouse::Event::CursorLeft) => {
                state.dragging = None;
                return Some(Action::publish(Message::ChartLeft));
            }
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if let Some(position) = cursor.position_in(bounds) {
                    match delta {
                        mouse::ScrollDelta::Lines { x: _, y }
                        | mouse::ScrollDelta::Pixels { x: _, y } => {
                            if y.abs() > 0.0 {
                                return Some(Action::publish(Message::ChartZoomed {
                                    anchor_x: position.x,
                                    delta: *y,
                                }));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        None
    }
}
