use proc_macro::TokenStream;
use quote::quote;
use syn::{LitStr, parse_macro_input};

/// Resolves a note name to a `tonestream::Frequency` at compile time.
///
/// The note string is `<letter>[accidental][octave]`:
/// - `letter` is one of `A`..`G` (case-insensitive)
/// - `accidental` is an optional `#` (sharp) or `b` (flat)
/// - `octave` is optional and defaults to 4; it must be in `-1..=9`
///
/// Frequencies use twelve-tone equal temperament with A4 = 440 Hz.
/// Malformed strings are reported with `compile_error!`.
///
/// # Examples
///
/// ```ignore
/// use tonestream::note;
///
/// let c5 = note!("C5");
/// let f_sharp = note!("F#3");
/// let a = note!("A"); // A4
/// ```
#[proc_macro]
pub fn note(input: TokenStream) -> TokenStream {
    let literal = parse_macro_input!(input as LitStr);
    let name = literal.value();

    match parse_note_name(&name).and_then(|(semitone, octave)| midi_number(semitone, octave)) {
        Ok(midi) => {
            let hz = midi_to_hz(midi);
            TokenStream::from(quote! {
                ::tonestream::Frequency::from_hz(#hz)
            })
        }
        Err(reason) => {
            let message = format!("invalid note '{}': {}", name, reason);
            TokenStream::from(quote! {
                compile_error!(#message)
            })
        }
    }
}

/// Semitone offset of a natural note letter above C.
fn letter_semitone(letter: char) -> Result<i32, String> {
    match letter.to_ascii_uppercase() {
        'C' => Ok(0),
        'D' => Ok(2),
        'E' => Ok(4),
        'F' => Ok(5),
        'G' => Ok(7),
        'A' => Ok(9),
        'B' => Ok(11),
        other => Err(format!("unknown note letter '{}'", other)),
    }
}

/// Splits a note name into a semitone offset (possibly outside 0..12 for
/// `Cb`/`B#`) and an octave number.
fn parse_note_name(name: &str) -> Result<(i32, i32), String> {
    let mut chars = name.chars();
    let letter = chars.next().ok_or_else(|| "empty string".to_string())?;
    let mut semitone = letter_semitone(letter)?;

    let rest = chars.as_str();
    let rest = if let Some(stripped) = rest.strip_prefix('#') {
        semitone += 1;
        stripped
    } else if let Some(stripped) = rest.strip_prefix('b') {
        semitone -= 1;
        stripped
    } else {
        rest
    };

    if rest.is_empty() {
        return Ok((semitone, 4));
    }

    let octave = rest
        .parse::<i32>()
        .map_err(|_| format!("invalid octave '{}'", rest))?;
    if !(-1..=9).contains(&octave) {
        return Err(format!("octave {} out of range (-1 to 9)", octave));
    }

    Ok((semitone, octave))
}

fn midi_number(semitone: i32, octave: i32) -> Result<i32, String> {
    let midi = (octave + 1) * 12 + semitone;
    if (0..=127).contains(&midi) {
        Ok(midi)
    } else {
        Err(format!("MIDI note {} out of range (0 to 127)", midi))
    }
}

fn midi_to_hz(midi: i32) -> f64 {
    440.0 * 2.0_f64.powf((midi as f64 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_semitone() {
        assert_eq!(letter_semitone('C'), Ok(0));
        assert_eq!(letter_semitone('g'), Ok(7));
        assert!(letter_semitone('H').is_err());
    }

    #[test]
    fn test_parse_note_name() {
        assert_eq!(parse_note_name("C5"), Ok((0, 5)));
        assert_eq!(parse_note_name("E"), Ok((4, 4)));
        assert_eq!(parse_note_name("F#3"), Ok((6, 3)));
        assert_eq!(parse_note_name("Bb-1"), Ok((10, -1)));

        assert!(parse_note_name("").is_err());
        assert!(parse_note_name("5").is_err());
        assert!(parse_note_name("C10").is_err());
        assert!(parse_note_name("Cx").is_err());
    }

    #[test]
    fn test_midi_range() {
        assert_eq!(midi_number(9, 4), Ok(69));
        assert_eq!(midi_number(0, -1), Ok(0));
        assert!(midi_number(-1, -1).is_err());
        assert!(midi_number(8, 9).is_err());
    }

    #[test]
    fn test_midi_to_hz() {
        assert!((midi_to_hz(69) - 440.0).abs() < 1e-9);
        assert!((midi_to_hz(72) - 523.25).abs() < 0.01);
        assert!((midi_to_hz(79) - 783.99).abs() < 0.01);
    }
}
