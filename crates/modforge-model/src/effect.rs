//! Effect opcodes and constructors.
//!
//! XM and IT number their effect commands differently: XM uses `0x0..=0xF`
//! for the classic ProTracker set plus letters above that, IT numbers the
//! letters `A..=Z` as `1..=26`. [`Effect`] constructors take the target
//! [`Format`] and pick the right opcode. Nibble arguments saturate at 15.

use crate::format::Format;
use crate::note::Effect;

/// XM effect commands.
pub mod xm {
    /// Arpeggio (0xy).
    pub const ARPEGGIO: u8 = 0x00;
    /// Portamento up (1xx).
    pub const PORTA_UP: u8 = 0x01;
    /// Portamento down (2xx).
    pub const PORTA_DOWN: u8 = 0x02;
    /// Tone portamento (3xx).
    pub const TONE_PORTA: u8 = 0x03;
    /// Vibrato (4xy).
    pub const VIBRATO: u8 = 0x04;
    /// Tone portamento + volume slide (5xy).
    pub const TONE_PORTA_VOL_SLIDE: u8 = 0x05;
    /// Vibrato + volume slide (6xy).
    pub const VIBRATO_VOL_SLIDE: u8 = 0x06;
    /// Tremolo (7xy).
    pub const TREMOLO: u8 = 0x07;
    /// Set panning (8xx).
    pub const SET_PANNING: u8 = 0x08;
    /// Sample offset in 256-frame steps (9xx).
    pub const SAMPLE_OFFSET: u8 = 0x09;
    /// Volume slide (Axy).
    pub const VOL_SLIDE: u8 = 0x0A;
    /// Position jump (Bxx).
    pub const POSITION_JUMP: u8 = 0x0B;
    /// Set volume (Cxx).
    pub const SET_VOLUME: u8 = 0x0C;
    /// Pattern break (Dxx), row in decimal digits.
    pub const PATTERN_BREAK: u8 = 0x0D;
    /// Extended effects (Exy).
    pub const EXTENDED: u8 = 0x0E;
    /// Speed below 32, tempo from 32 (Fxx).
    pub const SET_SPEED_TEMPO: u8 = 0x0F;
    /// Set global volume (Gxx).
    pub const GLOBAL_VOL: u8 = 0x10;
    /// Global volume slide (Hxy).
    pub const GLOBAL_VOL_SLIDE: u8 = 0x11;
    /// Key off at tick (Kxx).
    pub const KEY_OFF: u8 = 0x14;
    /// Set envelope position (Lxx).
    pub const SET_ENV_POS: u8 = 0x15;
    /// Panning slide (Pxy).
    pub const PAN_SLIDE: u8 = 0x19;
    /// Multi retrigger (Rxy).
    pub const RETRIGGER: u8 = 0x1B;
    /// Tremor (Txy).
    pub const TREMOR: u8 = 0x1D;
    /// Extra fine portamento (Xxy).
    pub const EXTRA_FINE_PORTA: u8 = 0x21;

    /// Sub-commands of [`EXTENDED`], in the high nibble of the parameter.
    pub mod extended {
        pub const FINE_PORTA_UP: u8 = 0x10;
        pub const FINE_PORTA_DOWN: u8 = 0x20;
        pub const GLISSANDO: u8 = 0x30;
        pub const VIBRATO_WAVEFORM: u8 = 0x40;
        pub const SET_FINETUNE: u8 = 0x50;
        pub const PATTERN_LOOP: u8 = 0x60;
        pub const TREMOLO_WAVEFORM: u8 = 0x70;
        pub const SET_PANNING_COARSE: u8 = 0x80;
        pub const RETRIGGER: u8 = 0x90;
        pub const FINE_VOL_UP: u8 = 0xA0;
        pub const FINE_VOL_DOWN: u8 = 0xB0;
        pub const NOTE_CUT: u8 = 0xC0;
        pub const NOTE_DELAY: u8 = 0xD0;
        pub const PATTERN_DELAY: u8 = 0xE0;
    }

    /// Volume-column ranges. Each command occupies one 16-value block with
    /// its argument in the low nibble, except set volume (`0x10..=0x50`).
    pub mod volume {
        pub const SET: u8 = 0x10;
        pub const SET_MAX: u8 = 0x50;
        pub const SLIDE_DOWN: u8 = 0x60;
        pub const SLIDE_UP: u8 = 0x70;
        pub const FINE_DOWN: u8 = 0x80;
        pub const FINE_UP: u8 = 0x90;
        pub const VIBRATO_SPEED: u8 = 0xA0;
        pub const VIBRATO_DEPTH: u8 = 0xB0;
        pub const SET_PANNING: u8 = 0xC0;
        pub const PAN_SLIDE_LEFT: u8 = 0xD0;
        pub const PAN_SLIDE_RIGHT: u8 = 0xE0;
        pub const TONE_PORTA: u8 = 0xF0;
    }
}

/// IT effect commands (letter-based: A=1, B=2, ...).
pub mod it {
    /// Set speed (Axx).
    pub const SET_SPEED: u8 = 1;
    /// Position jump (Bxx).
    pub const POSITION_JUMP: u8 = 2;
    /// Pattern break (Cxx).
    pub const PATTERN_BREAK: u8 = 3;
    /// Volume slide (Dxy).
    pub const VOLUME_SLIDE: u8 = 4;
    /// Portamento down (Exx).
    pub const PORTA_DOWN: u8 = 5;
    /// Portamento up (Fxx).
    pub const PORTA_UP: u8 = 6;
    /// Tone portamento (Gxx).
    pub const TONE_PORTA: u8 = 7;
    /// Vibrato (Hxy).
    pub const VIBRATO: u8 = 8;
    /// Tremor (Ixy).
    pub const TREMOR: u8 = 9;
    /// Arpeggio (Jxy).
    pub const ARPEGGIO: u8 = 10;
    /// Vibrato + volume slide (Kxy).
    pub const VIBRATO_VOL_SLIDE: u8 = 11;
    /// Tone portamento + volume slide (Lxy).
    pub const TONE_PORTA_VOL_SLIDE: u8 = 12;
    /// Set channel volume (Mxx).
    pub const SET_CHANNEL_VOL: u8 = 13;
    /// Channel volume slide (Nxy).
    pub const CHANNEL_VOL_SLIDE: u8 = 14;
    /// Sample offset (Oxx).
    pub const SAMPLE_OFFSET: u8 = 15;
    /// Panning slide (Pxy).
    pub const PANNING_SLIDE: u8 = 16;
    /// Retrigger (Qxy).
    pub const RETRIGGER: u8 = 17;
    /// Tremolo (Rxy).
    pub const TREMOLO: u8 = 18;
    /// Extended effects (Sxy).
    pub const EXTENDED: u8 = 19;
    /// Set tempo (Txx).
    pub const TEMPO: u8 = 20;
    /// Fine vibrato (Uxy).
    pub const FINE_VIBRATO: u8 = 21;
    /// Set global volume (Vxx).
    pub const SET_GLOBAL_VOL: u8 = 22;
    /// Global volume slide (Wxy).
    pub const GLOBAL_VOL_SLIDE: u8 = 23;
    /// Set panning (Xxx).
    pub const SET_PANNING: u8 = 24;
    /// Panbrello (Yxy).
    pub const PANBRELLO: u8 = 25;
    /// MIDI macro (Zxx).
    pub const MIDI_MACRO: u8 = 26;

    /// Sub-commands of [`EXTENDED`], in the high nibble of the parameter.
    pub mod extended {
        pub const GLISSANDO: u8 = 0x10;
        pub const SET_FINETUNE: u8 = 0x20;
        pub const VIBRATO_WAVEFORM: u8 = 0x30;
        pub const TREMOLO_WAVEFORM: u8 = 0x40;
        pub const PANBRELLO_WAVEFORM: u8 = 0x50;
        pub const FINE_PATTERN_DELAY: u8 = 0x60;
        pub const INSTRUMENT_CONTROL: u8 = 0x70;
        pub const SET_PANNING_COARSE: u8 = 0x80;
        pub const SOUND_CONTROL: u8 = 0x90;
        pub const HIGH_OFFSET: u8 = 0xA0;
        pub const PATTERN_LOOP: u8 = 0xB0;
        pub const NOTE_CUT: u8 = 0xC0;
        pub const NOTE_DELAY: u8 = 0xD0;
        pub const PATTERN_DELAY: u8 = 0xE0;
    }

    /// Volume-column ranges, inclusive lower bounds.
    pub mod volume {
        pub const SET: u8 = 0;
        pub const SET_MAX: u8 = 64;
        pub const FINE_UP: u8 = 65;
        pub const FINE_DOWN: u8 = 75;
        pub const SLIDE_UP: u8 = 85;
        pub const SLIDE_DOWN: u8 = 95;
        pub const PORTA_DOWN: u8 = 105;
        pub const PORTA_UP: u8 = 115;
        pub const SET_PANNING: u8 = 128;
        pub const SET_PANNING_MAX: u8 = 192;
        pub const TONE_PORTA: u8 = 193;
        pub const VIBRATO_DEPTH: u8 = 203;
    }
}

fn nibbles(high: u8, low: u8) -> u8 {
    (high.min(15) << 4) | low.min(15)
}

/// Volume-column byte that sets the note volume (0..=64, saturating).
pub fn set_volume_column(format: Format, volume: u8) -> u8 {
    let volume = volume.min(64);
    match format {
        Format::Xm => xm::volume::SET + volume,
        Format::It => volume,
    }
}

impl Effect {
    fn pick(format: Format, xm_command: u8, it_command: u8, param: u8) -> Self {
        match format {
            Format::Xm => Self::new(xm_command, param),
            Format::It => Self::new(it_command, param),
        }
    }

    /// Cycle the note through `+0`, `+x` and `+y` semitones.
    pub fn arpeggio(format: Format, x: u8, y: u8) -> Self {
        Self::pick(format, xm::ARPEGGIO, it::ARPEGGIO, nibbles(x, y))
    }

    pub fn portamento_up(format: Format, speed: u8) -> Self {
        Self::pick(format, xm::PORTA_UP, it::PORTA_UP, speed)
    }

    pub fn portamento_down(format: Format, speed: u8) -> Self {
        Self::pick(format, xm::PORTA_DOWN, it::PORTA_DOWN, speed)
    }

    /// Glide towards the cell's note at `speed`.
    pub fn tone_portamento(format: Format, speed: u8) -> Self {
        Self::pick(format, xm::TONE_PORTA, it::TONE_PORTA, speed)
    }

    pub fn vibrato(format: Format, speed: u8, depth: u8) -> Self {
        Self::pick(format, xm::VIBRATO, it::VIBRATO, nibbles(speed, depth))
    }

    pub fn tremolo(format: Format, speed: u8, depth: u8) -> Self {
        Self::pick(format, xm::TREMOLO, it::TREMOLO, nibbles(speed, depth))
    }

    /// Slide volume up or down per tick. Players ignore `down` when `up` is set.
    pub fn volume_slide(format: Format, up: u8, down: u8) -> Self {
        Self::pick(format, xm::VOL_SLIDE, it::VOLUME_SLIDE, nibbles(up, down))
    }

    /// Ticks per row, clamped to 1..=31 for XM and 1..=255 for IT.
    pub fn set_speed(format: Format, ticks: u8) -> Self {
        match format {
            Format::Xm => Self::new(xm::SET_SPEED_TEMPO, ticks.clamp(1, 31)),
            Format::It => Self::new(it::SET_SPEED, ticks.max(1)),
        }
    }

    /// Beats per minute, clamped to 32..=255.
    pub fn set_tempo(format: Format, bpm: u8) -> Self {
        Self::pick(format, xm::SET_SPEED_TEMPO, it::TEMPO, bpm.max(32))
    }

    /// Channel volume 0..=64. XM only; IT sets volume in the volume column
    /// (see [`set_volume_column`]).
    pub fn set_volume(format: Format, volume: u8) -> Option<Self> {
        match format {
            Format::Xm => Some(Self::new(xm::SET_VOLUME, volume.min(64))),
            Format::It => None,
        }
    }

    /// Pan position, 0 = left, 255 = right.
    pub fn set_panning(format: Format, position: u8) -> Self {
        Self::pick(format, xm::SET_PANNING, it::SET_PANNING, position)
    }

    /// Start the sample `offset * 256` frames in.
    pub fn sample_offset(format: Format, offset: u8) -> Self {
        Self::pick(format, xm::SAMPLE_OFFSET, it::SAMPLE_OFFSET, offset)
    }

    pub fn position_jump(format: Format, position: u8) -> Self {
        Self::pick(format, xm::POSITION_JUMP, it::POSITION_JUMP, position)
    }

    /// Continue at `row` of the next pattern. XM stores the row as two
    /// decimal digits and caps it at 99.
    pub fn pattern_break(format: Format, row: u8) -> Self {
        match format {
            Format::Xm => {
                let row = row.min(99);
                Self::new(xm::PATTERN_BREAK, ((row / 10) << 4) | (row % 10))
            }
            Format::It => Self::new(it::PATTERN_BREAK, row),
        }
    }

    fn extended(format: Format, xm_sub: u8, it_sub: u8, value: u8) -> Self {
        let value = value.min(15);
        match format {
            Format::Xm => Self::new(xm::EXTENDED, xm_sub | value),
            Format::It => Self::new(it::EXTENDED, it_sub | value),
        }
    }

    /// Cut the note at `tick` of the row.
    pub fn note_cut(format: Format, tick: u8) -> Self {
        Self::extended(format, xm::extended::NOTE_CUT, it::extended::NOTE_CUT, tick)
    }

    /// Delay the note until `tick` of the row.
    pub fn note_delay(format: Format, tick: u8) -> Self {
        Self::extended(format, xm::extended::NOTE_DELAY, it::extended::NOTE_DELAY, tick)
    }

    /// `count == 0` marks the loop start, otherwise loops back `count` times.
    pub fn pattern_loop(format: Format, count: u8) -> Self {
        Self::extended(format, xm::extended::PATTERN_LOOP, it::extended::PATTERN_LOOP, count)
    }

    /// Retrigger every `ticks` ticks, changing volume by the `volume_change`
    /// code on each retrigger. XM uses the plain `E9x` form when the volume
    /// is unchanged.
    pub fn retrigger(format: Format, ticks: u8, volume_change: u8) -> Self {
        match format {
            Format::Xm if volume_change == 0 => {
                Self::new(xm::EXTENDED, xm::extended::RETRIGGER | ticks.min(15))
            }
            Format::Xm => Self::new(xm::RETRIGGER, nibbles(volume_change, ticks)),
            Format::It => Self::new(it::RETRIGGER, nibbles(volume_change, ticks)),
        }
    }
}
