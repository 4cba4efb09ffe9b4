//! Navigation state machine
//!
//! Owns which function is on screen and whether a value is being edited.
//! Classified input arrives through [`NavigationStateMachine::handle`]; the
//! passage of time (timeouts, paging, alarm, timer, night mode) through
//! [`NavigationStateMachine::tick`], which also renders the display.
//!
//! Edits always work on an [`EditSession`] scratch copy. The clock and the
//! store only change when a session is committed.

use crate::config::{Capabilities, ClockConfig, NavConfig};
use crate::display::BrightnessLevel;
use crate::input::{ControlEvent, Disposition, EventKind, HoldTier};
use crate::time::{has_elapsed, is_time_in_range, DateTime, Millis};
use crate::traits::{
    reset_to_defaults, AlertSignal, AlertSource, AuxSource, Control, DigitSink, FieldId,
    PersistentStore, TimeSource,
};

use super::field::{EditSession, EditTarget};
use super::function::ClockFunction;
use super::render::{self, Format};
use super::settings::{enabled_options, OptionList};
use super::timer::{Timer, TimerRunoutPolicy};

/// Collaborators the machine reads and commands
pub struct Io<'a> {
    pub display: &'a mut dyn DigitSink,
    pub clock: &'a mut dyn TimeSource,
    pub store: &'a mut dyn PersistentStore,
    pub alert: &'a mut dyn AlertSignal,
    pub aux: &'a mut dyn AuxSource,
}

/// Top-level navigation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavState {
    /// Showing a function
    Running(ClockFunction),
    /// Editing a function's value, `field` is the cursor
    Editing { function: ClockFunction, field: u8 },
    /// Browsing settings
    SettingsMenu { option: u8 },
    /// Editing one setting
    SettingsEditing { option: u8 },
}

impl NavState {
    /// The live function
    pub fn function(&self) -> ClockFunction {
        match *self {
            NavState::Running(function) | NavState::Editing { function, .. } => function,
            NavState::SettingsMenu { option } | NavState::SettingsEditing { option } => {
                ClockFunction::SettingsOption(option)
            }
        }
    }
}

/// Date page sequence in progress
#[derive(Debug, Clone, Copy)]
struct Paging {
    index: usize,
    since: Millis,
    /// Captured on the first tick of the sequence
    snapshot: Option<DateTime>,
}

pub struct NavigationStateMachine {
    config: NavConfig,
    caps: Capabilities,
    fade_unit_ms: u32,
    options: OptionList,
    state: NavState,
    session: Option<EditSession>,
    entered_on_hold: bool,
    last_input: Millis,
    paging: Option<Paging>,
    timer: Timer,
    snapshot: DateTime,
    last_minute: Option<u16>,
    snooze_since: Option<Millis>,
    unoff_since: Option<Millis>,
    brightness: BrightnessLevel,
    ambient_enabled: bool,
}

fn adjust_delta(event: &ControlEvent) -> i32 {
    let step = if event.fast { 10 } else { 1 };
    if event.control == Control::Down {
        -step
    } else {
        step
    }
}

/// 0 = every day, 1 = Monday to Friday, 2 = Saturday and Sunday
fn alarm_day_matches(days: i32, weekday: u8) -> bool {
    let weekend = weekday == 0 || weekday == 6;
    match days {
        1 => !weekend,
        2 => weekend,
        _ => true,
    }
}

impl NavigationStateMachine {
    pub fn new(config: &ClockConfig, now: Millis) -> Self {
        Self {
            config: config.nav,
            caps: config.capabilities,
            fade_unit_ms: config.display.fade_unit_ms,
            options: enabled_options(&config.capabilities),
            state: NavState::Running(ClockFunction::TimeOfDay),
            session: None,
            entered_on_hold: false,
            last_input: now,
            paging: None,
            timer: Timer::new(),
            snapshot: DateTime::default(),
            last_minute: None,
            snooze_since: None,
            unoff_since: None,
            brightness: BrightnessLevel::Normal,
            ambient_enabled: false,
        }
    }

    /// Pick the start-up function from whatever control was held at power-on
    pub fn boot(&mut self, now: Millis, held: Option<Control>) {
        self.last_input = now;
        if held == Some(Control::Select) {
            info!("nav: version display");
            self.state = NavState::Running(ClockFunction::Version);
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn function(&self) -> ClockFunction {
        self.state.function()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn brightness(&self) -> BrightnessLevel {
        self.brightness
    }

    pub fn ambient_enabled(&self) -> bool {
        self.ambient_enabled
    }

    /// A field is being edited (the display square-waves)
    pub fn editing_field_active(&self) -> bool {
        self.session.is_some()
            && matches!(
                self.state,
                NavState::Editing { .. } | NavState::SettingsEditing { .. }
            )
    }

    pub fn is_snoozing(&self) -> bool {
        self.snooze_since.is_some()
    }

    /// Route one classified event
    pub fn handle(&mut self, now: Millis, event: ControlEvent, io: &mut Io<'_>) -> Disposition {
        self.last_input = now;
        if let Some(paging) = self.paging.as_mut() {
            paging.since = now;
        }
        debug!("nav: {:?} {:?}", event.control, event.kind);

        if let Some(disposition) = self.intercept(now, &event, io) {
            return disposition;
        }

        match self.state {
            NavState::Running(ClockFunction::Version) => self.handle_version(now, &event, io),
            NavState::Running(function) => match event.control {
                Control::Select => self.running_select(now, function, &event, io),
                Control::Alt => self.running_alt(now, function, &event, io),
                Control::Up | Control::Down => self.running_adjust(now, function, &event, io),
            },
            NavState::Editing { .. } => self.handle_editing(now, &event, io),
            NavState::SettingsMenu { option } => self.handle_menu(now, option, &event, io),
            NavState::SettingsEditing { option } => {
                self.handle_setting_edit(now, option, &event, io)
            }
        }
    }

    /// Alert silence, snooze cancel and night unoff take a press before anything else
    fn intercept(
        &mut self,
        now: Millis,
        event: &ControlEvent,
        io: &mut Io<'_>,
    ) -> Option<Disposition> {
        if event.kind != EventKind::Press {
            return None;
        }

        if io.alert.is_sounding() {
            let source = io.alert.source();
            io.alert.stop();
            let snooze = io.store.read_checked(FieldId::SnoozeMinutes);
            if source == Some(AlertSource::Alarm) && snooze > 0 {
                info!("nav: alarm snoozed for {} min", snooze);
                self.snooze_since = Some(now);
            } else {
                info!("nav: alert silenced");
            }
            return Some(Disposition::Stop);
        }

        if self.snooze_since.take().is_some() {
            info!("nav: snooze cancelled");
            io.alert.beep();
            io.display.display_blink();
            return Some(Disposition::Stop);
        }

        if self.brightness == BrightnessLevel::Off {
            self.unoff_since = Some(now);
            self.brightness = BrightnessLevel::Normal;
            return Some(Disposition::Stop);
        }

        None
    }

    fn handle_version(&mut self, now: Millis, event: &ControlEvent, io: &mut Io<'_>) -> Disposition {
        match (event.control, event.kind) {
            (Control::Select, EventKind::Hold(HoldTier::SuperLong)) => {
                warn!("nav: factory reset");
                reset_to_defaults(&mut *io.store);
                io.alert.beep();
                io.display.display_blink();
                self.enter(now, ClockFunction::TimeOfDay);
                Disposition::Stop
            }
            (Control::Select, EventKind::Release) => {
                self.enter(now, ClockFunction::TimeOfDay);
                Disposition::Continue
            }
            _ => Disposition::Continue,
        }
    }

    fn running_select(
        &mut self,
        now: Millis,
        function: ClockFunction,
        event: &ControlEvent,
        io: &mut Io<'_>,
    ) -> Disposition {
        match event.kind {
            EventKind::Hold(HoldTier::Short) => {
                if let Some(session) = self.session_for(function, io) {
                    self.begin_edit(function, session);
                }
                Disposition::Continue
            }
            EventKind::Hold(HoldTier::Long) => {
                self.enter_settings();
                Disposition::Stop
            }
            EventKind::Release if event.is_bare_release() => {
                self.rotate(now, function, 1);
                Disposition::Continue
            }
            _ => Disposition::Continue,
        }
    }

    fn running_alt(
        &mut self,
        now: Millis,
        function: ClockFunction,
        event: &ControlEvent,
        io: &mut Io<'_>,
    ) -> Disposition {
        if !self.caps.has_alt {
            return Disposition::Continue;
        }
        match event.kind {
            EventKind::Hold(HoldTier::Short) => {
                let preset = if function.is_date_page() {
                    ClockFunction::Date
                } else {
                    function
                };
                let ordinal = preset
                    .ordinal()
                    .filter(|_| ClockFunction::ROTATION.contains(&preset));
                if let Some(ordinal) = ordinal {
                    io.store.write_field(FieldId::AltPreset, ordinal as i32);
                    io.store.commit();
                    io.alert.beep();
                    io.display.display_blink();
                    info!("nav: alt preset stored");
                }
                Disposition::Stop
            }
            EventKind::Release if event.is_bare_release() => {
                let stored = io.store.read_checked(FieldId::AltPreset);
                let preset = u8::try_from(stored)
                    .ok()
                    .and_then(ClockFunction::from_ordinal)
                    .filter(|f| self.caps.has(*f))
                    .unwrap_or(ClockFunction::TimeOfDay);
                self.enter(now, preset);
                Disposition::Continue
            }
            _ => Disposition::Continue,
        }
    }

    fn running_adjust(
        &mut self,
        now: Millis,
        function: ClockFunction,
        event: &ControlEvent,
        io: &mut Io<'_>,
    ) -> Disposition {
        let up = event.control == Control::Up;
        match function {
            ClockFunction::Alarm => {
                if event.kind == EventKind::Press {
                    io.store.write_field(FieldId::AlarmOn, up as i32);
                    io.store.commit();
                }
                Disposition::Continue
            }
            ClockFunction::Timer => match (event.control, event.kind) {
                (Control::Up, EventKind::Press) => {
                    let duration_ms = io.store.read_checked(FieldId::TimerDuration) as u32 * 1000;
                    self.timer.toggle(now, duration_ms);
                    Disposition::Continue
                }
                (Control::Down, EventKind::Hold(HoldTier::Short)) => {
                    let policy = self.timer.policy().next();
                    self.timer.set_policy(policy);
                    io.store.write_field(FieldId::TimerRunout, policy.value());
                    io.store.commit();
                    io.alert.beep();
                    io.display.display_blink();
                    info!("nav: timer runout {:?}", policy);
                    Disposition::Stop
                }
                (Control::Down, EventKind::Release) if event.is_bare_release() => {
                    if self.timer.is_running() {
                        self.timer.lap(now);
                    } else {
                        self.timer.clear();
                    }
                    Disposition::Continue
                }
                _ => Disposition::Continue,
            },
            _ => {
                if event.kind == EventKind::Press {
                    self.rotate(now, function, if up { 1 } else { -1 });
                }
                Disposition::Continue
            }
        }
    }

    fn handle_editing(&mut self, now: Millis, event: &ControlEvent, io: &mut Io<'_>) -> Disposition {
        let function = self.state.function();
        let Some(session) = self.session.as_mut() else {
            self.enter(now, ClockFunction::TimeOfDay);
            return Disposition::Continue;
        };

        match (event.control, event.kind) {
            (Control::Select, EventKind::Press) => {
                if session.advance() {
                    self.state = NavState::Editing {
                        function,
                        field: session.cursor(),
                    };
                } else {
                    self.commit_session(io);
                    self.enter(now, function);
                }
                Disposition::Stop
            }
            // Holding on from the hold that opened an untouched edit reaches settings
            (Control::Select, EventKind::Hold(HoldTier::Long))
                if self.entered_on_hold && !session.touched() =>
            {
                self.session = None;
                self.enter_settings();
                Disposition::Stop
            }
            (Control::Up | Control::Down, _) if event.is_press_like() => {
                session.adjust(adjust_delta(event));
                Disposition::Continue
            }
            _ => Disposition::Continue,
        }
    }

    fn handle_menu(
        &mut self,
        now: Millis,
        option: u8,
        event: &ControlEvent,
        io: &mut Io<'_>,
    ) -> Disposition {
        match (event.control, event.kind) {
            (Control::Select, EventKind::Hold(HoldTier::Short)) => {
                info!("nav: leave settings");
                self.enter(now, ClockFunction::TimeOfDay);
                Disposition::Stop
            }
            (Control::Select, EventKind::Release) if event.is_bare_release() => {
                if let Some(&id) = self.options.get(option as usize) {
                    let value = io.store.read_checked(id);
                    self.session = Some(EditSession::setting(id, value));
                    self.state = NavState::SettingsEditing { option };
                }
                Disposition::Continue
            }
            (Control::Up | Control::Down, _) if event.is_press_like() => {
                let count = self.options.len() as i32;
                if count > 0 {
                    let step = if event.control == Control::Up { 1 } else { -1 };
                    let next = (option as i32 + step).rem_euclid(count) as u8;
                    self.state = NavState::SettingsMenu { option: next };
                }
                Disposition::Continue
            }
            _ => Disposition::Continue,
        }
    }

    fn handle_setting_edit(
        &mut self,
        now: Millis,
        option: u8,
        event: &ControlEvent,
        io: &mut Io<'_>,
    ) -> Disposition {
        match (event.control, event.kind) {
            (Control::Select, EventKind::Hold(HoldTier::Short)) => {
                self.commit_session(io);
                info!("nav: leave settings");
                self.enter(now, ClockFunction::TimeOfDay);
                Disposition::Stop
            }
            (Control::Select, EventKind::Release) if event.is_bare_release() => {
                self.commit_session(io);
                io.display.display_blink();
                self.state = NavState::SettingsMenu { option };
                Disposition::Continue
            }
            (Control::Up | Control::Down, _) if event.is_press_like() => {
                if let Some(session) = self.session.as_mut() {
                    session.adjust(adjust_delta(event));
                }
                Disposition::Continue
            }
            _ => Disposition::Continue,
        }
    }

    /// Scratch session for editing `function`, if it is editable right now
    fn session_for(&self, function: ClockFunction, io: &mut Io<'_>) -> Option<EditSession> {
        let now = &self.snapshot;
        match function {
            ClockFunction::TimeOfDay => Some(EditSession::time(now.minutes_of_day())),
            ClockFunction::Date => Some(EditSession::date(now.year, now.month, now.day)),
            ClockFunction::Alarm => Some(EditSession::alarm(
                io.store.read_checked(FieldId::AlarmTime),
            )),
            ClockFunction::Timer if !self.timer.is_running() => Some(EditSession::timer_duration(
                io.store.read_checked(FieldId::TimerDuration),
            )),
            _ => None,
        }
    }

    fn begin_edit(&mut self, function: ClockFunction, session: EditSession) {
        info!("nav: edit {:?}", session.target());
        self.session = Some(session);
        self.entered_on_hold = true;
        self.paging = None;
        self.state = NavState::Editing { function, field: 0 };
    }

    /// Copy the scratch values to where they belong
    fn commit_session(&mut self, io: &mut Io<'_>) {
        let Some(session) = self.session.take() else {
            return;
        };
        let value = session.value(0);
        match session.target() {
            EditTarget::Time => {
                io.clock.set_time((value / 60) as u8, (value % 60) as u8, 0);
            }
            EditTarget::Date => {
                io.clock
                    .set_date(value as u16, session.value(1) as u8, session.value(2) as u8);
            }
            EditTarget::Alarm => {
                io.store.write_field(FieldId::AlarmTime, value);
                io.store.commit();
            }
            EditTarget::TimerDuration => {
                io.store.write_field(FieldId::TimerDuration, value);
                io.store.commit();
                self.timer.clear();
            }
            EditTarget::Setting(id) => {
                io.store.write_field(id, value);
                io.store.commit();
            }
        }
        info!("nav: committed {:?}", session.target());
    }

    fn enter_settings(&mut self) {
        info!("nav: settings menu");
        self.session = None;
        self.paging = None;
        self.state = NavState::SettingsMenu { option: 0 };
    }

    /// Show `function`, starting its page sequence if it has one
    fn enter(&mut self, now: Millis, function: ClockFunction) {
        self.session = None;
        self.entered_on_hold = false;
        self.paging = (function == ClockFunction::Date).then_some(Paging {
            index: 0,
            since: now,
            snapshot: None,
        });
        self.state = NavState::Running(function);
    }

    /// Step through the enabled rotation, wrapping
    fn rotate(&mut self, now: Millis, from: ClockFunction, step: i32) {
        let from = if from.is_date_page() {
            ClockFunction::Date
        } else {
            from
        };
        let mut enabled = [ClockFunction::TimeOfDay; ClockFunction::ROTATION.len()];
        let mut count = 0;
        for function in ClockFunction::ROTATION {
            if self.caps.has(function) {
                enabled[count] = function;
                count += 1;
            }
        }
        let index = enabled[..count]
            .iter()
            .position(|f| *f == from)
            .unwrap_or(0) as i32;
        let next = enabled[(index + step).rem_euclid(count as i32) as usize];

        if from == ClockFunction::Timer && !self.timer.is_running() {
            self.timer.clear();
        }
        debug!("nav: {:?} -> {:?}", from, next);
        self.enter(now, next);
    }

    /// Advance timers, apply timeouts and render
    pub fn tick(&mut self, now: Millis, io: &mut Io<'_>) {
        let snapshot = io.clock.snapshot();
        self.snapshot = snapshot;
        self.timer.set_policy(TimerRunoutPolicy::from_value(
            io.store.read_checked(FieldId::TimerRunout),
        ));

        self.expire(now);
        self.advance_page(now, io);
        self.service_alarm(now, &snapshot, io);
        if self.timer.tick(now) {
            info!("nav: timer runout");
            io.alert.start(AlertSource::Timer);
        }
        self.update_brightness(now, &snapshot, io.store);

        let fade_units = io.store.read_checked(FieldId::FadeDuration).max(0) as u32;
        io.display.set_fade_duration(fade_units * self.fade_unit_ms);

        self.render(now, &snapshot, io);
    }

    fn expire(&mut self, now: Millis) {
        let idle = |timeout| has_elapsed(now, self.last_input, timeout);
        match self.state {
            NavState::Editing { .. }
            | NavState::SettingsMenu { .. }
            | NavState::SettingsEditing { .. } => {
                if idle(self.config.settings_timeout_ms) {
                    info!("nav: edit timed out");
                    self.enter(now, ClockFunction::TimeOfDay);
                }
            }
            NavState::Running(function) => {
                let paged = self.paging.is_some();
                let held = function == ClockFunction::Timer && self.timer.is_running();
                if function.is_temporary()
                    && !paged
                    && !held
                    && idle(self.config.temp_timeout_ms)
                {
                    self.enter(now, ClockFunction::TimeOfDay);
                }
            }
        }
    }

    fn page_available(&self, page: ClockFunction, at: &DateTime, aux: &mut dyn AuxSource) -> bool {
        self.caps.has(page)
            && match page {
                ClockFunction::Sun => aux.sun_event(at).is_some(),
                ClockFunction::Weather => aux.weather().is_some(),
                _ => true,
            }
    }

    fn advance_page(&mut self, now: Millis, io: &mut Io<'_>) {
        let Some(mut paging) = self.paging else {
            return;
        };
        let at = *paging.snapshot.get_or_insert(self.snapshot);
        self.paging = Some(paging);
        if !has_elapsed(now, paging.since, self.config.page_timeout_ms) {
            return;
        }

        let pages = ClockFunction::DATE_PAGES;
        let next = (paging.index + 1..pages.len())
            .find(|&i| self.page_available(pages[i], &at, io.aux));
        match next {
            Some(index) => {
                self.paging = Some(Paging {
                    index,
                    since: now,
                    snapshot: Some(at),
                });
                self.state = NavState::Running(pages[index]);
            }
            None => self.enter(now, ClockFunction::TimeOfDay),
        }
    }

    fn service_alarm(&mut self, now: Millis, snapshot: &DateTime, io: &mut Io<'_>) {
        if let Some(since) = self.snooze_since {
            let snooze_ms = io.store.read_checked(FieldId::SnoozeMinutes).max(0) as u32 * 60_000;
            if has_elapsed(now, since, snooze_ms) {
                info!("nav: snooze over");
                self.snooze_since = None;
                io.alert.start(AlertSource::Alarm);
            }
        }

        let minute = snapshot.minutes_of_day();
        let previous = self.last_minute.replace(minute);
        // Only a minute boundary seen while running can trigger
        if previous.is_none() || previous == Some(minute) {
            return;
        }
        if !self.caps.has(ClockFunction::Alarm) || io.store.read_checked(FieldId::AlarmOn) == 0 {
            return;
        }
        if io.store.read_checked(FieldId::AlarmTime) != minute as i32
            || !alarm_day_matches(io.store.read_checked(FieldId::AlarmDays), snapshot.weekday)
        {
            return;
        }
        if !io.alert.is_sounding() {
            info!("nav: alarm");
            self.snooze_since = None;
            io.alert.start(AlertSource::Alarm);
        }
    }

    fn update_brightness(&mut self, now: Millis, snapshot: &DateTime, store: &mut dyn PersistentStore) {
        let mode = store.read_checked(FieldId::NightMode);
        let night = mode != 0
            && is_time_in_range(
                store.read_checked(FieldId::NightStart) as u16,
                store.read_checked(FieldId::NightEnd) as u16,
                snapshot.minutes_of_day(),
            );
        let level = match (night, mode) {
            (false, _) => BrightnessLevel::Normal,
            (true, 1) => BrightnessLevel::Dim,
            (true, _) => BrightnessLevel::Off,
        };

        if let Some(since) = self.unoff_since {
            if level != BrightnessLevel::Off || has_elapsed(now, since, self.config.unoff_ms) {
                self.unoff_since = None;
            }
        }
        let level = match level {
            BrightnessLevel::Off if self.unoff_since.is_some() => BrightnessLevel::Normal,
            level => level,
        };
        if level != self.brightness {
            debug!("nav: brightness {:?}", level);
            self.brightness = level;
        }

        self.ambient_enabled = self.caps.has_ambient && store.read_checked(FieldId::AutoDim) == 1;
    }

    fn render(&mut self, now: Millis, snapshot: &DateTime, io: &mut Io<'_>) {
        let format = Format {
            twelve_hour: io.store.read_checked(FieldId::HourFormat) == 1,
            leading_zero: io.store.read_checked(FieldId::LeadingZero) == 1,
            date_format: io.store.read_checked(FieldId::DateFormat),
        };

        match self.state {
            NavState::Running(function) => self.render_function(now, function, snapshot, &format, io),
            NavState::Editing { .. } => {
                let Some(session) = self.session.as_ref() else {
                    return;
                };
                match session.target() {
                    EditTarget::Time | EditTarget::Alarm => {
                        render::clock_minutes(io.display, session.value(0), false)
                    }
                    EditTarget::Date => render::date(
                        io.display,
                        &format,
                        session.value(0) as u16,
                        session.value(1) as u8,
                        session.value(2) as u8,
                    ),
                    EditTarget::TimerDuration => {
                        render::duration(io.display, session.value(0).max(0) as u32, false)
                    }
                    EditTarget::Setting(id) => render::setting(io.display, 0, id, session.value(0)),
                }
            }
            NavState::SettingsMenu { option } => {
                if let Some(&id) = self.options.get(option as usize) {
                    let value = io.store.read_checked(id);
                    render::setting(io.display, option, id, value);
                }
            }
            NavState::SettingsEditing { option } => {
                if let (Some(&id), Some(session)) =
                    (self.options.get(option as usize), self.session.as_ref())
                {
                    render::setting(io.display, option, id, session.value(0));
                }
            }
        }
    }

    fn render_function(
        &mut self,
        now: Millis,
        function: ClockFunction,
        snapshot: &DateTime,
        format: &Format,
        io: &mut Io<'_>,
    ) {
        // Date pages all read the time captured when the sequence began
        let paged = self
            .paging
            .and_then(|p| p.snapshot)
            .unwrap_or(*snapshot);

        match function {
            ClockFunction::TimeOfDay => render::time_of_day(io.display, format, snapshot, true),
            ClockFunction::Date => {
                render::date(io.display, format, paged.year, paged.month, paged.day)
            }
            ClockFunction::DayCounter => {
                let month = io.store.read_checked(FieldId::DayCounterMonth) as u8;
                let day = io.store.read_checked(FieldId::DayCounterDay) as u8;
                let days = crate::time::days_until(&paged, month, day);
                render::number(io.display, Some(days as u32));
            }
            ClockFunction::Sun => match io.aux.sun_event(&paged) {
                Some(event) => render::clock_minutes(io.display, event.minutes as i32, true),
                None => render::number(io.display, None),
            },
            ClockFunction::Weather => {
                let degrees = io.aux.weather().map(i32::from);
                render::signed(io.display, degrees);
            }
            ClockFunction::Thermometer => {
                let degrees = io.aux.temperature_centi().map(|c| c / 100);
                render::signed(io.display, degrees);
            }
            ClockFunction::TubeTest => render::sweep(io.display, snapshot.second % 10),
            ClockFunction::Version => {
                let width = io.display.width();
                io.display
                    .set_digits(render::VERSION, 0, width.saturating_sub(1), true, false);
            }
            ClockFunction::Alarm => {
                let minutes = io.store.read_checked(FieldId::AlarmTime);
                let on = io.store.read_checked(FieldId::AlarmOn) == 1;
                render::alarm(io.display, minutes, on);
            }
            ClockFunction::Timer => {
                let seconds = match self.timer.lap_value(now, self.config.page_timeout_ms) {
                    Some(ms) => ms / 1000,
                    None => self.timer.value_seconds(now),
                };
                render::duration(io.display, seconds, true);
            }
            ClockFunction::SettingsOption(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FunctionSet;
    use crate::display::frame::write_blank;
    use crate::display::write_value;
    use crate::traits::{Digit, NoAux, SunEvent, MAX_DIGITS};

    struct MockDisplay {
        width: u8,
        digits: [Digit; MAX_DIGITS],
        blinks: u32,
        fade_ms: u32,
    }

    impl MockDisplay {
        fn text(&self) -> String {
            self.digits[..self.width as usize]
                .iter()
                .map(|d| match d.value() {
                    Some(v) => char::from(b'0' + v),
                    None => ' ',
                })
                .collect()
        }
    }

    impl DigitSink for MockDisplay {
        fn width(&self) -> u8 {
            self.width
        }

        fn set_digits(&mut self, value: u32, start: u8, end: u8, leading_zeros: bool, _fade: bool) {
            let width = self.width as usize;
            write_value(&mut self.digits[..width], value, start, end, leading_zeros);
        }

        fn blank(&mut self, start: u8, end: u8, _fade: bool) {
            let width = self.width as usize;
            write_blank(&mut self.digits[..width], start, end);
        }

        fn display_blink(&mut self) {
            self.blinks += 1;
        }

        fn set_fade_duration(&mut self, ms: u32) {
            self.fade_ms = ms;
        }
    }

    struct MockClock {
        now: DateTime,
    }

    impl TimeSource for MockClock {
        fn snapshot(&mut self) -> DateTime {
            self.now
        }

        fn set_time(&mut self, hour: u8, minute: u8, second: u8) {
            let d = self.now;
            self.now = DateTime::new(d.year, d.month, d.day, hour, minute, second);
        }

        fn set_date(&mut self, year: u16, month: u8, day: u8) {
            let d = self.now;
            self.now = DateTime::new(year, month, day, d.hour, d.minute, d.second);
        }
    }

    struct MockStore {
        values: [i32; FieldId::COUNT],
        commits: u32,
    }

    impl MockStore {
        fn new() -> Self {
            let mut values = [0; FieldId::COUNT];
            for id in FieldId::ALL {
                values[id.index()] = id.default_value();
            }
            Self { values, commits: 0 }
        }
    }

    impl PersistentStore for MockStore {
        fn read_field(&mut self, id: FieldId) -> i32 {
            self.values[id.index()]
        }

        fn write_field(&mut self, id: FieldId, value: i32) -> bool {
            let changed = self.values[id.index()] != value;
            self.values[id.index()] = value;
            changed
        }

        fn commit(&mut self) {
            self.commits += 1;
        }
    }

    #[derive(Default)]
    struct MockAlert {
        sounding: Option<AlertSource>,
        starts: Vec<AlertSource>,
        beeps: u32,
    }

    impl AlertSignal for MockAlert {
        fn is_sounding(&self) -> bool {
            self.sounding.is_some()
        }

        fn source(&self) -> Option<AlertSource> {
            self.sounding
        }

        fn start(&mut self, source: AlertSource) {
            self.sounding = Some(source);
            self.starts.push(source);
        }

        fn stop(&mut self) {
            self.sounding = None;
        }

        fn beep(&mut self) {
            self.beeps += 1;
        }
    }

    struct SunAndWeather;

    impl AuxSource for SunAndWeather {
        fn sun_event(&mut self, _at: &DateTime) -> Option<SunEvent> {
            Some(SunEvent {
                rising: true,
                minutes: 6 * 60 + 45,
            })
        }

        fn weather(&mut self) -> Option<i16> {
            Some(-4)
        }
    }

    struct Rig<X: AuxSource = NoAux> {
        display: MockDisplay,
        clock: MockClock,
        store: MockStore,
        alert: MockAlert,
        aux: X,
        nav: NavigationStateMachine,
    }

    fn rig_with<X: AuxSource>(config: ClockConfig, aux: X) -> Rig<X> {
        Rig {
            display: MockDisplay {
                width: config.display.width,
                digits: [Digit::BLANK; MAX_DIGITS],
                blinks: 0,
                fade_ms: 0,
            },
            clock: MockClock {
                now: DateTime::new(2024, 3, 9, 12, 0, 0),
            },
            store: MockStore::new(),
            alert: MockAlert::default(),
            aux,
            nav: NavigationStateMachine::new(&config, 0),
        }
    }

    fn rig() -> Rig {
        rig_with(ClockConfig::default(), NoAux)
    }

    impl<X: AuxSource> Rig<X> {
        fn send(&mut self, now: Millis, event: ControlEvent) -> Disposition {
            let mut io = Io {
                display: &mut self.display,
                clock: &mut self.clock,
                store: &mut self.store,
                alert: &mut self.alert,
                aux: &mut self.aux,
            };
            self.nav.handle(now, event, &mut io)
        }

        fn tick(&mut self, now: Millis) {
            let mut io = Io {
                display: &mut self.display,
                clock: &mut self.clock,
                store: &mut self.store,
                alert: &mut self.alert,
                aux: &mut self.aux,
            };
            self.nav.tick(now, &mut io);
        }

        fn click(&mut self, now: Millis, control: Control) {
            self.send(now, ControlEvent::press(control));
            self.send(now, release(control, HoldTier::None));
        }

        fn field(&self, id: FieldId) -> i32 {
            self.store.values[id.index()]
        }
    }

    fn hold(control: Control, tier: HoldTier) -> ControlEvent {
        ControlEvent {
            control,
            kind: EventKind::Hold(tier),
            previous: HoldTier::None,
            fast: false,
        }
    }

    fn release(control: Control, previous: HoldTier) -> ControlEvent {
        ControlEvent {
            control,
            kind: EventKind::Release,
            previous,
            fast: false,
        }
    }

    fn running(function: ClockFunction) -> NavState {
        NavState::Running(function)
    }

    #[test]
    fn test_select_release_rotates_enabled_functions() {
        let mut rig = rig();
        rig.click(10, Control::Select);
        assert_eq!(rig.nav.state(), running(ClockFunction::Date));
        rig.click(20, Control::Select);
        assert_eq!(rig.nav.state(), running(ClockFunction::Alarm));
        rig.click(30, Control::Select);
        assert_eq!(rig.nav.state(), running(ClockFunction::Timer));
        // Thermometer and tube test are off by default
        rig.click(40, Control::Select);
        assert_eq!(rig.nav.state(), running(ClockFunction::TimeOfDay));
    }

    #[test]
    fn test_alarm_hour_edit_commits_390() {
        let mut rig = rig();
        rig.store.values[FieldId::AlarmTime.index()] = 90;
        rig.click(10, Control::Select);
        rig.click(20, Control::Select);
        assert_eq!(rig.nav.function(), ClockFunction::Alarm);

        rig.send(100, ControlEvent::press(Control::Select));
        rig.send(1100, hold(Control::Select, HoldTier::Short));
        assert_eq!(
            rig.nav.state(),
            NavState::Editing {
                function: ClockFunction::Alarm,
                field: 0
            }
        );
        assert!(rig.nav.editing_field_active());
        rig.send(1200, release(Control::Select, HoldTier::Short));

        for i in 0..5 {
            rig.send(1300 + i * 200, ControlEvent::press(Control::Up));
        }
        // Nothing reaches the store before confirmation
        assert_eq!(rig.field(FieldId::AlarmTime), 90);

        assert_eq!(rig.send(3000, ControlEvent::press(Control::Select)), Disposition::Stop);
        assert_eq!(
            rig.nav.state(),
            NavState::Editing {
                function: ClockFunction::Alarm,
                field: 1
            }
        );
        rig.send(3500, ControlEvent::press(Control::Select));
        assert_eq!(rig.field(FieldId::AlarmTime), 390);
        assert_eq!(rig.nav.state(), running(ClockFunction::Alarm));
        assert!(rig.nav.session().is_none());
    }

    #[test]
    fn test_fast_adjust_steps_ten() {
        let mut rig = rig();
        rig.tick(0);
        rig.send(0, hold(Control::Select, HoldTier::Short));
        rig.send(100, ControlEvent::press(Control::Select));
        let fast_down = ControlEvent {
            fast: true,
            ..ControlEvent::press(Control::Down)
        };
        rig.send(200, fast_down);
        // Noon, minute field: 00 - 10 wraps to 50
        assert_eq!(rig.nav.session().map(|s| s.value(0)), Some(12 * 60 + 50));
    }

    #[test]
    fn test_time_edit_sets_clock() {
        let mut rig = rig();
        rig.tick(0);
        rig.send(0, hold(Control::Select, HoldTier::Short));
        rig.send(10, ControlEvent::press(Control::Down));
        rig.send(20, ControlEvent::press(Control::Select));
        rig.send(30, ControlEvent::press(Control::Select));
        assert_eq!(rig.clock.now.hour, 11);
        assert_eq!(rig.clock.now.minute, 0);
    }

    #[test]
    fn test_long_hold_enters_settings_from_untouched_edit() {
        let mut rig = rig();
        rig.send(0, ControlEvent::press(Control::Select));
        rig.send(1000, hold(Control::Select, HoldTier::Short));
        assert!(matches!(rig.nav.state(), NavState::Editing { .. }));
        let disposition = rig.send(3000, hold(Control::Select, HoldTier::Long));
        assert_eq!(disposition, Disposition::Stop);
        assert_eq!(rig.nav.state(), NavState::SettingsMenu { option: 0 });
    }

    #[test]
    fn test_settings_browse_edit_save() {
        let mut rig = rig();
        rig.send(0, hold(Control::Select, HoldTier::Long));
        rig.send(100, ControlEvent::press(Control::Up));
        assert_eq!(rig.nav.state(), NavState::SettingsMenu { option: 1 });
        rig.send(200, ControlEvent::press(Control::Down));
        rig.send(300, ControlEvent::press(Control::Down));
        let last = rig.nav.options.len() as u8 - 1;
        assert_eq!(rig.nav.state(), NavState::SettingsMenu { option: last });
        rig.send(400, ControlEvent::press(Control::Up));

        // Option 0 is the hour format
        rig.click(500, Control::Select);
        assert_eq!(rig.nav.state(), NavState::SettingsEditing { option: 0 });
        rig.send(600, ControlEvent::press(Control::Down));
        rig.tick(650);
        assert_eq!(rig.display.text(), " 1   1");
        assert_eq!(rig.field(FieldId::HourFormat), 2);

        rig.click(700, Control::Select);
        assert_eq!(rig.field(FieldId::HourFormat), 1);
        assert_eq!(rig.display.blinks, 1);
        assert_eq!(rig.nav.state(), NavState::SettingsMenu { option: 0 });

        rig.send(800, hold(Control::Select, HoldTier::Short));
        assert_eq!(rig.nav.state(), running(ClockFunction::TimeOfDay));
    }

    #[test]
    fn test_settings_exit_hold_commits_scratch() {
        let mut rig = rig();
        rig.send(0, hold(Control::Select, HoldTier::Long));
        rig.send(100, ControlEvent::press(Control::Up));
        rig.click(200, Control::Select);
        rig.send(300, ControlEvent::press(Control::Up));
        assert_eq!(
            rig.send(400, hold(Control::Select, HoldTier::Short)),
            Disposition::Stop
        );
        assert_eq!(rig.field(FieldId::LeadingZero), 1);
        assert_eq!(rig.nav.state(), running(ClockFunction::TimeOfDay));
    }

    #[test]
    fn test_edit_timeout_discards_scratch() {
        let mut rig = rig();
        rig.store.values[FieldId::AlarmTime.index()] = 90;
        rig.click(10, Control::Select);
        rig.click(20, Control::Select);
        rig.send(1000, hold(Control::Select, HoldTier::Short));
        rig.send(1100, ControlEvent::press(Control::Up));

        rig.tick(1100 + 299_999);
        assert!(matches!(rig.nav.state(), NavState::Editing { .. }));
        rig.tick(1100 + 300_000);
        assert_eq!(rig.nav.state(), running(ClockFunction::TimeOfDay));
        assert_eq!(rig.field(FieldId::AlarmTime), 90);
    }

    #[test]
    fn test_temporary_function_reverts() {
        let mut rig = rig();
        rig.click(0, Control::Select);
        rig.click(10, Control::Select);
        assert_eq!(rig.nav.function(), ClockFunction::Alarm);
        rig.tick(4000);
        // Input before the timeout restarts it
        rig.send(4000, ControlEvent::press(Control::Up));
        rig.tick(8999);
        assert_eq!(rig.nav.function(), ClockFunction::Alarm);
        rig.tick(9000);
        assert_eq!(rig.nav.function(), ClockFunction::TimeOfDay);
    }

    #[test]
    fn test_running_timer_does_not_revert() {
        let mut rig = rig();
        for t in 0..3 {
            rig.click(t, Control::Select);
        }
        assert_eq!(rig.nav.function(), ClockFunction::Timer);
        rig.send(10, ControlEvent::press(Control::Up));
        assert!(rig.nav.timer().is_running());
        rig.tick(60_000);
        assert_eq!(rig.nav.function(), ClockFunction::Timer);
        assert_eq!(rig.display.text(), "000059");
    }

    #[test]
    fn test_timer_runout_starts_alert() {
        let mut rig = rig();
        rig.store.values[FieldId::TimerDuration.index()] = 2;
        for t in 0..3 {
            rig.click(t, Control::Select);
        }
        rig.send(100, ControlEvent::press(Control::Up));
        rig.tick(1500);
        assert_eq!(rig.display.text(), "000001");
        rig.tick(2100);
        assert_eq!(rig.alert.starts, vec![AlertSource::Timer]);
        assert!(!rig.nav.timer().is_running());

        // The press that silences the alert does nothing else
        assert_eq!(
            rig.send(2200, ControlEvent::press(Control::Up)),
            Disposition::Stop
        );
        assert!(!rig.alert.is_sounding());
        assert!(!rig.nav.timer().is_running());
        assert!(!rig.nav.is_snoozing());
    }

    #[test]
    fn test_timer_restarts_from_duration_after_runout() {
        let mut rig = rig();
        rig.store.values[FieldId::TimerDuration.index()] = 2;
        for t in 0..3 {
            rig.click(t, Control::Select);
        }
        rig.send(100, ControlEvent::press(Control::Up));
        rig.tick(2200);
        assert_eq!(rig.alert.starts.len(), 1);
        rig.send(2300, ControlEvent::press(Control::Up));
        assert!(!rig.alert.is_sounding());

        rig.send(3000, ControlEvent::press(Control::Up));
        rig.tick(3001);
        assert!(rig.nav.timer().is_running());
        assert_eq!(rig.nav.timer().value_seconds(3001), 2);
        assert_eq!(rig.alert.starts.len(), 1);
        assert_eq!(rig.display.text(), "000002");
    }

    #[test]
    fn test_timer_down_hold_cycles_runout() {
        let mut rig = rig();
        for t in 0..3 {
            rig.click(t, Control::Select);
        }
        rig.send(10, ControlEvent::press(Control::Down));
        assert_eq!(
            rig.send(1010, hold(Control::Down, HoldTier::Short)),
            Disposition::Stop
        );
        assert_eq!(rig.field(FieldId::TimerRunout), 1);
        assert_eq!(rig.nav.timer().policy(), TimerRunoutPolicy::Repeat);
        assert_eq!(rig.alert.beeps, 1);
    }

    #[test]
    fn test_alarm_fires_on_minute_edge_and_snoozes() {
        let mut rig = rig();
        rig.store.values[FieldId::AlarmTime.index()] = 7 * 60;
        rig.store.values[FieldId::AlarmOn.index()] = 1;
        rig.store.values[FieldId::SnoozeMinutes.index()] = 5;

        // Booting inside the alarm minute does not ring
        rig.clock.now = DateTime::new(2024, 3, 9, 7, 0, 10);
        rig.tick(0);
        assert!(rig.alert.starts.is_empty());

        rig.clock.now = DateTime::new(2024, 3, 10, 6, 59, 59);
        rig.tick(1000);
        rig.clock.now = DateTime::new(2024, 3, 10, 7, 0, 0);
        rig.tick(2000);
        assert_eq!(rig.alert.starts, vec![AlertSource::Alarm]);

        rig.send(3000, ControlEvent::press(Control::Select));
        assert!(!rig.alert.is_sounding());
        assert!(rig.nav.is_snoozing());

        rig.tick(3000 + 5 * 60_000 - 1);
        assert_eq!(rig.alert.starts.len(), 1);
        rig.tick(3000 + 5 * 60_000);
        assert_eq!(rig.alert.starts.len(), 2);
        assert!(!rig.nav.is_snoozing());
    }

    #[test]
    fn test_press_cancels_snooze() {
        let mut rig = rig();
        rig.store.values[FieldId::SnoozeMinutes.index()] = 9;
        rig.alert.sounding = Some(AlertSource::Alarm);
        rig.send(0, ControlEvent::press(Control::Up));
        assert!(rig.nav.is_snoozing());

        assert_eq!(
            rig.send(500, ControlEvent::press(Control::Select)),
            Disposition::Stop
        );
        assert!(!rig.nav.is_snoozing());
        assert_eq!(rig.alert.beeps, 1);
        assert_eq!(rig.display.blinks, 1);
        assert_eq!(rig.nav.function(), ClockFunction::TimeOfDay);
    }

    #[test]
    fn test_alarm_days_filter() {
        assert!(alarm_day_matches(0, 0));
        assert!(alarm_day_matches(1, 3));
        assert!(!alarm_day_matches(1, 6));
        assert!(alarm_day_matches(2, 0));
        assert!(!alarm_day_matches(2, 1));

        let mut rig = rig();
        rig.store.values[FieldId::AlarmTime.index()] = 7 * 60;
        rig.store.values[FieldId::AlarmOn.index()] = 1;
        rig.store.values[FieldId::AlarmDays.index()] = 1;
        // 2024-03-09 is a Saturday
        rig.clock.now = DateTime::new(2024, 3, 9, 6, 59, 0);
        rig.tick(0);
        rig.clock.now = DateTime::new(2024, 3, 9, 7, 0, 0);
        rig.tick(1000);
        assert!(rig.alert.starts.is_empty());
    }

    #[test]
    fn test_night_off_and_unoff() {
        let mut rig = rig();
        rig.store.values[FieldId::NightMode.index()] = 2;
        rig.clock.now = DateTime::new(2024, 3, 9, 23, 0, 0);
        rig.tick(0);
        assert_eq!(rig.nav.brightness(), BrightnessLevel::Off);

        // The waking press is consumed
        assert_eq!(
            rig.send(100, ControlEvent::press(Control::Select)),
            Disposition::Stop
        );
        rig.tick(200);
        assert_eq!(rig.nav.brightness(), BrightnessLevel::Normal);
        rig.tick(100 + 10_000);
        assert_eq!(rig.nav.brightness(), BrightnessLevel::Off);

        rig.store.values[FieldId::NightMode.index()] = 1;
        rig.tick(20_000);
        assert_eq!(rig.nav.brightness(), BrightnessLevel::Dim);
        rig.clock.now = DateTime::new(2024, 3, 10, 8, 0, 0);
        rig.tick(21_000);
        assert_eq!(rig.nav.brightness(), BrightnessLevel::Normal);
    }

    #[test]
    fn test_version_release_and_factory_reset() {
        let mut rig = rig();
        rig.nav.boot(0, Some(Control::Select));
        assert_eq!(rig.nav.function(), ClockFunction::Version);
        rig.send(2000, release(Control::Select, HoldTier::Long));
        assert_eq!(rig.nav.function(), ClockFunction::TimeOfDay);

        rig.store.values[FieldId::HourFormat.index()] = 1;
        rig.nav.boot(0, Some(Control::Select));
        let disposition = rig.send(10_000, hold(Control::Select, HoldTier::SuperLong));
        assert_eq!(disposition, Disposition::Stop);
        assert_eq!(rig.field(FieldId::HourFormat), 2);
        assert_eq!(rig.alert.beeps, 1);
        assert_eq!(rig.display.blinks, 1);
        assert_eq!(rig.nav.function(), ClockFunction::TimeOfDay);
    }

    #[test]
    fn test_alt_preset_store_and_recall() {
        let mut config = ClockConfig::default();
        config.capabilities.has_alt = true;
        let mut rig = rig_with(config, NoAux);
        rig.click(0, Control::Select);
        rig.click(10, Control::Select);
        assert_eq!(rig.nav.function(), ClockFunction::Alarm);
        assert_eq!(rig.send(1000, hold(Control::Alt, HoldTier::Short)), Disposition::Stop);
        assert_eq!(rig.field(FieldId::AltPreset), 2);

        rig.tick(10_000);
        assert_eq!(rig.nav.function(), ClockFunction::TimeOfDay);
        rig.click(11_000, Control::Alt);
        assert_eq!(rig.nav.function(), ClockFunction::Alarm);
    }

    #[test]
    fn test_date_pages_share_snapshot() {
        let mut config = ClockConfig::default();
        config.capabilities.functions.insert(ClockFunction::Sun);
        config.capabilities.functions.insert(ClockFunction::Weather);
        let mut rig = rig_with(config, SunAndWeather);
        rig.store.values[FieldId::DayCounterMonth.index()] = 3;
        rig.store.values[FieldId::DayCounterDay.index()] = 19;

        rig.clock.now = DateTime::new(2024, 3, 9, 23, 59, 58);
        rig.click(0, Control::Select);
        rig.tick(0);
        assert_eq!(rig.display.text(), "030924");

        // Midnight passes mid-sequence; the pages keep the captured day
        rig.clock.now = DateTime::new(2024, 3, 10, 0, 0, 1);
        rig.tick(3000);
        assert_eq!(rig.nav.function(), ClockFunction::DayCounter);
        assert_eq!(rig.display.text(), "    10");
        rig.tick(6000);
        assert_eq!(rig.nav.function(), ClockFunction::Sun);
        assert_eq!(rig.display.text(), "0645  ");
        rig.tick(9000);
        assert_eq!(rig.nav.function(), ClockFunction::Weather);
        assert_eq!(rig.display.text(), "000004");
        rig.tick(12_000);
        assert_eq!(rig.nav.function(), ClockFunction::TimeOfDay);
    }

    #[test]
    fn test_unavailable_pages_are_skipped() {
        let mut rig = rig();
        rig.click(0, Control::Select);
        rig.tick(0);
        rig.tick(3000);
        assert_eq!(rig.nav.function(), ClockFunction::DayCounter);
        // Sun and weather are disabled
        rig.tick(6000);
        assert_eq!(rig.nav.function(), ClockFunction::TimeOfDay);
    }

    #[test]
    fn test_disabled_functions_skipped_both_ways() {
        let mut config = ClockConfig::default();
        config.capabilities.functions = FunctionSet::empty();
        config.capabilities.functions.insert(ClockFunction::Timer);
        let mut rig = rig_with(config, NoAux);
        rig.send(0, ControlEvent::press(Control::Down));
        assert_eq!(rig.nav.function(), ClockFunction::Timer);
        rig.click(10, Control::Select);
        assert_eq!(rig.nav.function(), ClockFunction::TimeOfDay);
    }

    #[test]
    fn test_tick_renders_time_and_fade() {
        let mut rig = rig();
        rig.clock.now = DateTime::new(2024, 3, 9, 9, 41, 7);
        rig.tick(0);
        assert_eq!(rig.display.text(), " 94107");
        assert_eq!(rig.display.fade_ms, 50);
        assert!(!rig.nav.editing_field_active());
    }
}
