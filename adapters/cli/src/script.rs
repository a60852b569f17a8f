//! Parsing of `--moves` scripts such as `1:left,2:down`.

use anyhow::{anyhow, Context, Result};
use hakoiri_core::{Direction, PieceId};

/// Single scripted move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScriptedMove {
    pub(crate) piece: PieceId,
    pub(crate) direction: Direction,
}

/// Parses a comma separated list of `piece:direction` tokens.
///
/// The whole script is validated before any move is returned. Empty tokens
/// (such as a trailing comma) are skipped.
pub(crate) fn parse_moves(script: &str) -> Result<Vec<ScriptedMove>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| {
            parse_token(token).with_context(|| format!("invalid move #{} `{token}`", index + 1))
        })
        .collect()
}

fn parse_token(token: &str) -> Result<ScriptedMove> {
    let (piece, direction) = token
        .split_once(':')
        .ok_or_else(|| anyhow!("expected `piece:direction`"))?;
    let piece = piece
        .trim()
        .parse::<u32>()
        .with_context(|| format!("`{}` is not a piece number", piece.trim()))?;
    let direction = direction.parse::<Direction>()?;
    Ok(ScriptedMove {
        piece: PieceId::new(piece),
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pieces_and_directions() {
        let moves = parse_moves("2:left, 4:UP,").expect("valid script");
        assert_eq!(
            moves,
            vec![
                ScriptedMove {
                    piece: PieceId::new(2),
                    direction: Direction::Left,
                },
                ScriptedMove {
                    piece: PieceId::new(4),
                    direction: Direction::Up,
                },
            ]
        );
    }

    #[test]
    fn empty_script_yields_no_moves() {
        assert!(parse_moves("").expect("empty script").is_empty());
    }

    #[test]
    fn invalid_direction_is_reported_with_position() {
        let error = parse_moves("2:left,1:sideways").expect_err("bad direction");
        let message = format!("{error:#}");
        assert!(message.contains("invalid move #2"));
        assert!(message.contains("sideways"));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(parse_moves("left").is_err());
        assert!(parse_moves("x:left").is_err());
        assert!(parse_moves("-1:left").is_err());
    }
}
