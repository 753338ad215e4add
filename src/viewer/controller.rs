//! Mesh view controller: selection state, cameras, tables and fetches.
//!
//! The controller is the single owner of all table and camera state. It
//! never blocks on the replay: requests go to the [`FetchWorker`] and results
//! are applied in [`MeshViewController::poll`] on the owner's thread.

use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::camera::{
    ArcballCamera, Camera, CameraController, CameraKind, FlyCamera, Key, Modifiers, MouseEvent,
};
use crate::format::{AttributeLayout, DeclParser, FormatParser};
use crate::table::{BufferTable, NumberFormat};
use crate::util::{Result, Vec3, ViewportSize};

use super::config::{
    CameraGuess, DrawRange, MeshDataStage, MeshDisplayConfig, SolidShadeMode, DEFAULT_FAR, DEFAULT_NEAR,
};
use super::fetch::{self, FetchRequest, Fetched, RawSource};
use super::replay::{MeshFormat, PipelineSnapshot, RenderTarget, ReplaySource, ResourceId};
use super::settings::Settings;
use super::worker::{FetchWorker, WorkerResult};

/// Interval at which the host should call [`MeshViewController::tick`].
pub const CAMERA_TICK: Duration = Duration::from_millis(10);

/// Orbit distance after a camera reset.
const RESET_DISTANCE: f32 = 10.0;

/// Scroll and selection of one table view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableViewState {
    pub selected_row: Option<u32>,
    /// First visible row.
    pub scroll_row: u32,
}

/// Owner of the three stage tables and the preview camera.
pub struct MeshViewController {
    mesh_view: bool,
    tables: [BufferTable; 3],
    views: [TableViewState; 3],
    focused: Option<MeshDataStage>,
    row_offset: u32,

    stage: MeshDataStage,
    pipeline: PipelineSnapshot,
    parser: Box<dyn FormatParser>,
    raw: Option<RawSource>,
    raw_columns: Vec<AttributeLayout>,
    format_errors: Vec<String>,
    diagnostics: Vec<String>,

    camera: Camera,
    camera_speed: f32,
    viewport: ViewportSize,

    cur_instance: u32,
    draw_range: DrawRange,
    shade_mode: SolidShadeMode,
    wireframe: bool,
    highlight_vertices: bool,
    sync_views: bool,
    hex_by_default: bool,
    guess: CameraGuess,

    vs_in_format: MeshFormat,
    post_vs: MeshFormat,
    post_gs: MeshFormat,

    target: Option<Box<dyn RenderTarget>>,
    worker: FetchWorker,
    generation: u64,
    applied: u64,
}

impl MeshViewController {
    /// Create a controller that fetches from `source` on a worker thread.
    ///
    /// `mesh_view` adds the `VTX`/`IDX` columns and enables the stage tables;
    /// without it the controller shows one raw buffer or texture.
    pub fn new(source: Box<dyn ReplaySource>, mesh_view: bool, settings: &Settings) -> Self {
        let tables = MeshDataStage::ALL.map(|_| {
            let mut t = BufferTable::new(mesh_view);
            t.set_number_format(settings.number_format);
            t
        });

        let mut ctl = Self {
            mesh_view,
            tables,
            views: Default::default(),
            focused: None,
            row_offset: 0,
            stage: MeshDataStage::VSIn,
            pipeline: PipelineSnapshot::default(),
            parser: Box::new(DeclParser),
            raw: None,
            raw_columns: Vec::new(),
            format_errors: Vec::new(),
            diagnostics: Vec::new(),
            camera: Camera::default(),
            camera_speed: settings.camera_speed,
            viewport: ViewportSize::default(),
            cur_instance: 0,
            draw_range: DrawRange::OnlyThisDraw,
            shade_mode: settings.solid_shade,
            wireframe: settings.wireframe || settings.solid_shade == SolidShadeMode::None,
            highlight_vertices: settings.highlight_vertices,
            sync_views: settings.sync_views,
            hex_by_default: settings.hex_by_default,
            guess: CameraGuess {
                fov: settings.fov_guess,
                ..CameraGuess::default()
            },
            vs_in_format: MeshFormat::default(),
            post_vs: MeshFormat::default(),
            post_gs: MeshFormat::default(),
            target: None,
            worker: FetchWorker::spawn(source),
            generation: 0,
            applied: 0,
        };
        ctl.reset_camera();
        ctl
    }

    /// Use a different parser for raw view format strings.
    pub fn with_parser(mut self, parser: Box<dyn FormatParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Current state as persistable settings.
    pub fn settings(&self) -> Settings {
        Settings {
            camera_speed: self.camera_speed,
            fov_guess: self.guess.fov,
            sync_views: self.sync_views,
            highlight_vertices: self.highlight_vertices,
            hex_by_default: self.hex_by_default,
            number_format: self.tables[0].number_format(),
            solid_shade: self.shade_mode,
            wireframe: self.wireframe,
        }
    }

    // ========================================================================
    // Render target
    // ========================================================================

    pub fn attach_target(&mut self, target: Box<dyn RenderTarget>) {
        self.target = Some(target);
        self.display();
    }

    pub fn detach_target(&mut self) -> Option<Box<dyn RenderTarget>> {
        self.target.take()
    }

    /// Push a fresh display configuration and redraw. No-op without a target.
    pub fn display(&mut self) {
        if self.target.is_none() {
            return;
        }
        let config = self.display_config();
        if let Some(target) = self.target.as_mut() {
            target.set_mesh_display(&config);
            target.display();
        }
    }

    /// Display configuration for the current state.
    pub fn display_config(&self) -> MeshDisplayConfig {
        let (est_near, est_far) = match self.stage {
            MeshDataStage::VSIn => (0.0, 0.0),
            MeshDataStage::VSOut => (self.post_vs.near_plane, self.post_vs.far_plane),
            MeshDataStage::GSOut => (self.post_gs.near_plane, self.post_gs.far_plane),
        };
        let near = self
            .guess
            .near
            .unwrap_or(if est_near > 0.0 { est_near } else { DEFAULT_NEAR });
        let far = self
            .guess
            .far
            .unwrap_or(if est_far > 0.0 { est_far } else { DEFAULT_FAR });

        let mut position = self.stage_format(self.stage).clone();
        position.near_plane = near;
        position.far_plane = far;

        MeshDisplayConfig {
            stage: self.stage,
            camera_kind: self.camera.kind(),
            camera: self.camera.basis(),
            view: self.camera.view_matrix(),
            wireframe: self.wireframe,
            shade_mode: self.shade_mode,
            show_prev_instances: self.draw_range.show_prev_instances(),
            show_all_instances: self.draw_range.show_all_instances(),
            show_whole_pass: self.draw_range.show_whole_pass(),
            highlight_vertex: self.highlight_vertex(),
            cur_instance: self.cur_instance,
            fov: self.guess.fov,
            aspect: self
                .guess
                .aspect
                .or_else(|| self.pipeline.viewport.aspect())
                .unwrap_or(1.0),
            near,
            far,
            ortho: self.guess.ortho,
            position,
        }
    }

    fn stage_format(&self, stage: MeshDataStage) -> &MeshFormat {
        match stage {
            MeshDataStage::VSIn => &self.vs_in_format,
            MeshDataStage::VSOut => &self.post_vs,
            MeshDataStage::GSOut => &self.post_gs,
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// New event selected: take its pipeline state and refetch.
    pub fn set_pipeline(&mut self, pipeline: PipelineSnapshot) {
        self.pipeline = pipeline;
        let instances = self.pipeline.num_instances();
        if instances <= 1 {
            self.cur_instance = 0;
        } else {
            self.cur_instance = self.cur_instance.min(instances - 1);
        }
        self.refresh();
    }

    pub fn pipeline(&self) -> &PipelineSnapshot {
        &self.pipeline
    }

    /// Select the instance whose per-instance data is shown, and refetch.
    pub fn set_instance(&mut self, instance: u32) {
        let max = self.pipeline.num_instances().saturating_sub(1);
        self.cur_instance = instance.min(max);
        self.refresh();
    }

    #[inline]
    pub fn cur_instance(&self) -> u32 {
        self.cur_instance
    }

    pub fn set_stage(&mut self, stage: MeshDataStage) {
        self.stage = stage;
        self.reset_camera();
    }

    #[inline]
    pub fn stage(&self) -> MeshDataStage {
        self.stage
    }

    /// True when the current stage holds clip-space positions.
    pub fn is_current_raster_out(&self) -> bool {
        match self.stage {
            MeshDataStage::VSIn => false,
            MeshDataStage::VSOut => !self.pipeline.tessellation,
            MeshDataStage::GSOut => true,
        }
    }

    pub fn set_draw_range(&mut self, range: DrawRange) {
        self.draw_range = range;
        self.display();
    }

    #[inline]
    pub fn draw_range(&self) -> DrawRange {
        self.draw_range
    }

    /// Without a solid fill, wireframe is forced on.
    pub fn set_shade_mode(&mut self, mode: SolidShadeMode) {
        self.shade_mode = mode;
        if mode == SolidShadeMode::None {
            self.wireframe = true;
        }
        self.display();
    }

    #[inline]
    pub fn shade_mode(&self) -> SolidShadeMode {
        self.shade_mode
    }

    /// Ignored while the shade mode is `None`.
    pub fn set_wireframe(&mut self, wireframe: bool) {
        if self.shade_mode == SolidShadeMode::None {
            return;
        }
        self.wireframe = wireframe;
        self.display();
    }

    #[inline]
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn set_camera_guess(&mut self, guess: CameraGuess) {
        self.guess = guess;
        self.display();
    }

    #[inline]
    pub fn camera_guess(&self) -> CameraGuess {
        self.guess
    }

    // ========================================================================
    // Raw view
    // ========================================================================

    /// Show `size` bytes of buffer `id` from `offset` as rows of `format`.
    /// `size == u64::MAX` shows the rest of the buffer.
    pub fn view_buffer(&mut self, offset: u64, size: u64, id: ResourceId, format: &str) {
        self.raw = Some(RawSource::Buffer { id, offset, size });
        self.process_format(format);
    }

    /// Show one subresource of texture `id` as rows of `format`.
    pub fn view_texture(&mut self, array_idx: u32, mip: u32, id: ResourceId, format: &str) {
        self.raw = Some(RawSource::Texture { id, array_idx, mip });
        self.process_format(format);
    }

    fn process_format(&mut self, format: &str) {
        if self.mesh_view {
            self.mesh_view = false;
            for t in &mut self.tables {
                t.set_mesh_view(false);
            }
        }

        let (mut columns, errors) = self.parser.parse(format);
        if !errors.is_empty() {
            warn!("{} format error(s)", errors.len());
        }
        if self.hex_by_default {
            for c in &mut columns {
                c.hex = true;
            }
        }
        self.format_errors = errors;
        self.raw_columns = columns;

        for t in &mut self.tables {
            t.clear();
        }
        self.refresh();
    }

    /// Errors from the last format string.
    pub fn format_errors(&self) -> &[String] {
        &self.format_errors
    }

    /// Problems found in the last mesh fetch, e.g. conflicting buffer usage.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    #[inline]
    pub fn is_mesh_view(&self) -> bool {
        self.mesh_view
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    fn refresh(&mut self) {
        let request = if self.mesh_view {
            for t in &mut self.tables {
                t.set_cur_instance(self.cur_instance);
            }
            self.vs_in_format = fetch::input_mesh_format(&self.pipeline);
            FetchRequest::Mesh {
                pipeline: self.pipeline.clone(),
                cur_instance: self.cur_instance,
            }
        } else {
            let Some(source) = self.raw else {
                return;
            };
            FetchRequest::Raw {
                source,
                columns: self.raw_columns.clone(),
            }
        };

        for t in &mut self.tables {
            t.begin_reset();
        }

        self.generation += 1;
        debug!("Requesting fetch generation {}", self.generation);
        if let Err(e) = self.worker.request(request, self.generation) {
            error!("Fetch request failed: {}", e);
            for t in &mut self.tables {
                t.end_reset();
            }
        }
    }

    /// Generation of the last issued request.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while a requested fetch has not been applied.
    pub fn is_fetching(&self) -> bool {
        self.applied < self.generation
    }

    /// Apply all results the worker has delivered. Returns how many.
    pub fn poll(&mut self) -> usize {
        let mut count = 0;
        while let Some(res) = self.worker.try_recv() {
            self.apply(res);
            count += 1;
        }
        count
    }

    /// Block until the latest fetch is applied or `timeout` passes.
    /// Returns whether the fetch completed.
    pub fn wait_for_fetch(&mut self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        while self.is_fetching() {
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            match self.worker.recv_timeout(deadline - now)? {
                Some(res) => self.apply(res),
                None => return Ok(false),
            }
        }
        self.poll();
        Ok(true)
    }

    fn apply(&mut self, res: WorkerResult) {
        match res {
            WorkerResult::Fetched { generation, result } => {
                let _span = tracing::info_span!("apply_fetch", generation).entered();
                if generation < self.generation {
                    // Superseded requests are not cancelled; the stale data
                    // still lands and is replaced once the newer one arrives.
                    warn!(
                        "Applying superseded fetch generation {} (latest {})",
                        generation, self.generation
                    );
                }
                self.applied = self.applied.max(generation);

                match result {
                    Ok(Fetched::Mesh(data)) => {
                        self.tables[0].replace(data.vs_in);
                        self.tables[1].replace(data.vs_out);
                        self.tables[2].replace(data.gs_out);
                        self.post_vs = data.post_vs;
                        self.post_gs = data.post_gs;
                        self.diagnostics = data.diagnostics;
                    }
                    Ok(Fetched::Raw(contents)) => {
                        self.tables[0].replace(contents);
                        self.tables[1].clear();
                        self.tables[2].clear();
                    }
                    Err(e) => {
                        error!("Fetch failed: {}", e);
                        for t in &mut self.tables {
                            t.clear();
                        }
                    }
                }

                self.row_offset = self.row_offset.min(self.row_offset_max());
                for stage in MeshDataStage::ALL {
                    self.scroll_to_row(stage, self.row_offset);
                }
                self.display();
            }
            WorkerResult::Picked { vertex, instance } => self.apply_pick(vertex, instance),
        }
    }

    fn apply_pick(&mut self, vertex: u32, instance: u32) {
        debug!("Picked vertex {} of instance {}", vertex, instance);
        if instance != self.cur_instance {
            self.set_instance(instance);
        }

        let stage = self.stage;
        if vertex < self.table(stage).row_count() {
            self.scroll_to_row(stage, vertex);
        }
        self.sync_views(Some(stage), true, true);
        self.display();
    }

    /// Ask the replay for the vertex under preview pixel `(x, y)`.
    pub fn pick(&mut self, x: u32, y: u32) {
        if let Err(e) = self.worker.pick(self.pipeline.event_id(), x, y) {
            error!("Pick request failed: {}", e);
        }
    }

    // ========================================================================
    // Tables
    // ========================================================================

    pub fn table(&self, stage: MeshDataStage) -> &BufferTable {
        &self.tables[stage.index()]
    }

    pub fn current_table(&self) -> &BufferTable {
        self.table(self.stage)
    }

    pub fn view_state(&self, stage: MeshDataStage) -> TableViewState {
        self.views[stage.index()]
    }

    pub fn set_number_format(&mut self, number: NumberFormat) {
        for t in &mut self.tables {
            t.set_number_format(number);
        }
    }

    /// User selected `row` in the table of `stage`.
    pub fn select_row(&mut self, stage: MeshDataStage, row: u32) {
        self.views[stage.index()].selected_row = Some(row);
        self.focused = Some(stage);
        self.sync_views(Some(stage), true, false);
        self.display();
    }

    /// User scrolled the table of `stage` so `row` is at the top.
    pub fn scroll(&mut self, stage: MeshDataStage, row: u32) {
        self.views[stage.index()].scroll_row = row;
        self.focused = Some(stage);
        self.sync_views(Some(stage), false, true);
    }

    /// Put `row` at the top of the table of `stage` and select it.
    pub fn scroll_to_row(&mut self, stage: MeshDataStage, row: u32) {
        let view = &mut self.views[stage.index()];
        view.scroll_row = row;
        view.selected_row = Some(row);
    }

    /// Largest row offset: one less than the longest table.
    pub fn row_offset_max(&self) -> u32 {
        self.tables
            .iter()
            .map(|t| t.row_count())
            .max()
            .unwrap_or(0)
            .saturating_sub(1)
    }

    /// Scroll every table to `row` (clamped).
    pub fn set_row_offset(&mut self, row: u32) {
        self.row_offset = row.min(self.row_offset_max());
        for stage in MeshDataStage::ALL {
            self.scroll_to_row(stage, self.row_offset);
        }
    }

    #[inline]
    pub fn row_offset(&self) -> u32 {
        self.row_offset
    }

    /// Copy selection and/or scroll from `primary` (default: the focused
    /// table, else the input table) to the other tables.
    pub fn sync_views(&mut self, primary: Option<MeshDataStage>, selection: bool, scroll: bool) {
        if !self.sync_views {
            return;
        }
        let primary = primary.or(self.focused).unwrap_or(MeshDataStage::VSIn);
        let src = self.views[primary.index()];

        for stage in MeshDataStage::ALL {
            if stage == primary {
                continue;
            }
            let view = &mut self.views[stage.index()];
            if selection {
                if let Some(row) = src.selected_row {
                    view.selected_row = Some(row);
                }
            }
            if scroll {
                view.scroll_row = src.scroll_row;
            }
        }
    }

    pub fn set_sync_views(&mut self, sync: bool) {
        self.sync_views = sync;
        self.sync_views(None, true, true);
    }

    #[inline]
    pub fn is_sync_views(&self) -> bool {
        self.sync_views
    }

    pub fn set_highlight_vertices(&mut self, highlight: bool) {
        self.highlight_vertices = highlight;
        self.display();
    }

    /// Selected row of the current table, or `u32::MAX` when highlighting is
    /// off or nothing is selected.
    pub fn highlight_vertex(&self) -> u32 {
        if !self.highlight_vertices {
            return u32::MAX;
        }
        self.views[self.stage.index()].selected_row.unwrap_or(u32::MAX)
    }

    // ========================================================================
    // Camera
    // ========================================================================

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Switch navigation scheme. Both schemes start from their reset pose.
    pub fn set_camera_kind(&mut self, kind: CameraKind) {
        self.camera = match kind {
            CameraKind::Arcball => Camera::Arcball(ArcballCamera::new(Vec3::ZERO, RESET_DISTANCE)),
            CameraKind::Fly => {
                let pos = if self.is_current_raster_out() {
                    Vec3::ZERO
                } else {
                    Vec3::new(0.0, 0.0, -RESET_DISTANCE)
                };
                Camera::Fly(FlyCamera::new(pos))
            }
        };
        self.camera.set_speed_multiplier(self.camera_speed);
        self.camera.update(self.viewport);
        self.display();
    }

    /// Fly for clip-space stages, arcball otherwise.
    pub fn reset_camera(&mut self) {
        let kind = if self.is_current_raster_out() {
            CameraKind::Fly
        } else {
            CameraKind::Arcball
        };
        self.set_camera_kind(kind);
    }

    /// Frame the positions (first attribute) of the current table.
    ///
    /// Only for stages that are not already in clip space. Returns whether
    /// the camera moved.
    pub fn autofit_camera(&mut self) -> bool {
        if self.is_current_raster_out() {
            return false;
        }
        let bounds = self.current_table().bounds(0);
        if bounds.is_empty() {
            return false;
        }

        let center = bounds.center();
        let distance = (bounds.radius() * 2.5).max(1.0);
        match &mut self.camera {
            Camera::Arcball(c) => c.reset(center, distance),
            Camera::Fly(c) => c.reset(center + Vec3::new(0.0, 0.0, distance)),
        }
        self.display();
        true
    }

    pub fn set_camera_speed(&mut self, speed: f32) {
        self.camera_speed = speed;
        self.camera.set_speed_multiplier(speed);
    }

    /// Preview surface resized.
    pub fn resize(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
        self.camera.update(viewport);
        self.display();
    }

    /// Periodic camera update, every [`CAMERA_TICK`]. Redraws if the camera
    /// moved. Does nothing without a render target.
    pub fn tick(&mut self) -> bool {
        if self.target.is_none() {
            return false;
        }
        let moved = self.camera.update(self.viewport);
        if moved {
            self.display();
        }
        moved
    }

    /// Right button picks a vertex.
    pub fn mouse_click(&mut self, e: &MouseEvent) {
        if e.buttons.right && self.target.is_some() {
            self.pick(e.pos.x.max(0.0) as u32, e.pos.y.max(0.0) as u32);
        }
        self.camera.mouse_click(e);
        self.display();
    }

    pub fn mouse_move(&mut self, e: &MouseEvent) {
        self.camera.mouse_move(e);
        if e.buttons.right && self.target.is_some() {
            self.pick(e.pos.x.max(0.0) as u32, e.pos.y.max(0.0) as u32);
        }
        self.display();
    }

    pub fn mouse_wheel(&mut self, delta: f32) {
        self.camera.mouse_wheel(delta);
        self.display();
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) {
        self.camera.key_down(key, modifiers);
    }

    pub fn key_up(&mut self, key: Key, modifiers: Modifiers) {
        self.camera.key_up(key, modifiers);
    }

    /// Preview lost keyboard/mouse focus: drop held keys and any drag.
    pub fn focus_lost(&mut self) {
        self.camera.nav_mut().release_all();
    }
}
