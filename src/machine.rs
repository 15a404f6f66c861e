use crate::{
    devices::Renderer,
    error::{Error, Result},
    interpreter::Interpreter,
};

/// Instructions executed per host tick, roughly 600Hz on a 60Hz host.
pub const CYCLES_PER_TICK: usize = 10;
/// The timers count down on every `TIMER_DIVIDER`th tick.
pub const TIMER_DIVIDER: u64 = 2;

pub type ErrorHook = Box<dyn FnMut(&Error)>;

/// Drives the interpreter from a host clock.
///
/// The host calls [`Machine::tick`] once per frame. Every tick runs a burst of
/// instructions, pushes the frame to the [`Renderer`] if it changed and, on
/// every other tick, counts the timers down.
pub struct Machine {
    interpreter: Interpreter,
    renderer: Option<Box<dyn Renderer>>,
    error_hook: Option<ErrorHook>,
    running: bool,
    loaded: bool,
    ticks: u64,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_interpreter(Interpreter::with_seed(seed))
    }

    fn with_interpreter(interpreter: Interpreter) -> Self {
        Machine {
            interpreter,
            renderer: None,
            error_hook: None,
            running: false,
            loaded: false,
            ticks: 0,
        }
    }

    pub fn set_renderer<R: Renderer + 'static>(&mut self, renderer: R) {
        self.renderer = Some(Box::new(renderer));
    }

    /// Every error raised while ticking is handed to `hook`, after it was logged.
    pub fn set_error_hook<F: FnMut(&Error) + 'static>(&mut self, hook: F) {
        self.error_hook = Some(Box::new(hook));
    }

    pub fn reset(&mut self) {
        log::debug!("Resetting the machine");
        self.interpreter.reset();
        self.running = false;
        self.loaded = false;
        self.ticks = 0;
    }

    /// Stops and resets the machine, copies the rom into memory and starts
    /// running it.
    pub fn load(&mut self, rom: &[u8]) -> Result<()> {
        self.stop();
        self.reset();

        self.interpreter.load(rom).map_err(|err| {
            log::error!("{}", err);
            err
        })?;
        self.loaded = true;
        log::debug!("Loaded a rom of {} bytes", rom.len());

        self.start()
    }

    pub fn start(&mut self) -> Result<()> {
        if self.renderer.is_none() {
            return Err(Error::MissingRenderer);
        }
        if !self.loaded {
            return Err(Error::NoRomLoaded);
        }

        log::debug!("Starting the machine");
        self.running = true;
        Ok(())
    }

    /// Halts the instruction stream, the timers keep counting down as long as
    /// the host keeps ticking.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Stopping the machine");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances the machine by one host frame.
    pub fn tick(&mut self) -> Result<()> {
        if self.renderer.is_none() {
            return Err(Error::MissingRenderer);
        }

        for _ in 0..CYCLES_PER_TICK {
            if !self.running || self.interpreter.is_awaiting_key() {
                break;
            }

            if let Err(err) = self.interpreter.cycle() {
                self.report(&err);

                if !err.is_recoverable() {
                    self.stop();
                }
            }
        }

        let frame_dirty = self.interpreter.take_frame_dirty();
        let beep = self.ticks % TIMER_DIVIDER == 0 && self.interpreter.decrement_timers();
        self.ticks = self.ticks.wrapping_add(1);

        if let Some(renderer) = self.renderer.as_mut() {
            if frame_dirty {
                renderer.render(self.interpreter.display().pixels());
            }
            if beep {
                renderer.beep();
            }
        }

        Ok(())
    }

    /// Marks `key` as pressed. A pending key wait is resolved with it.
    /// Keys outside of `0-F` are ignored.
    pub fn press_key(&mut self, key: u8) {
        if !self.interpreter.keyboard_mut().press_key(key) {
            log::debug!("Ignoring unknown key {:#X}", key);
            return;
        }

        self.interpreter.resolve_waiting_key(key);
    }

    pub fn release_key(&mut self, key: u8) {
        self.interpreter.keyboard_mut().release_key(key);
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn report(&mut self, err: &Error) {
        if err.is_recoverable() {
            log::warn!("{}", err);
        } else {
            log::error!("Halting: {}", err);
        }

        if let Some(hook) = self.error_hook.as_mut() {
            hook(err);
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
