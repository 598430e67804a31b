use crate::context::LexContext;
use crate::error::LexResult;
use crate::token::Token;

/// A lexing rule that operates on a context.
///
/// Rules are generic over the context so they can be reused by any
/// [`LexContext`] implementation. They are immutable once built: one rule set
/// is shared by every stream a definition creates.
pub trait LexingRule<Ctx>: Send + Sync
where
    Ctx: LexContext,
{
    /// Attempts to match and consume a token from the context.
    ///
    /// Returns `Ok(Some(token))` if matched and `Ok(None)` otherwise. The
    /// lexer restores the cursor after `Ok(None)` and after an error, so a
    /// rule may bail out half-way through its input.
    fn try_match(&self, ctx: &mut Ctx) -> LexResult<Option<Token>>;

    /// Returns the priority of this rule. Higher priority rules are tried first.
    /// Default priority is 0.
    fn priority(&self) -> i32 {
        0
    }

    /// Quick check: returns whether this rule might match based on the first character.
    ///
    /// - `Some(true)`  - This rule might match (or definitely matches)
    /// - `Some(false)` - This rule definitely won't match
    /// - `None`        - Unknown, need to try full match
    #[inline]
    fn quick_check(&self, first_char: Option<char>) -> Option<bool> {
        let _ = first_char;
        None
    }
}
