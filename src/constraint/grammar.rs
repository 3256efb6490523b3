//! Grammar for one shorthand argument using chumsky
//!
//! A shorthand right-hand side such as `@title.bottom:>12:$750` is split into arguments
//! (`@title.bottom`, `>12`, `$750`) and each argument is parsed here into an [`Argument`].

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::attribute::Relation;
use super::descriptor::{ConstantSign, MultiplierSign};
use super::lexer::{invalid_spans, lex, Token};
use crate::error::ShorthandError;

/// One modifier-tagged argument
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// `@peer` or `@peer.attribute`
    Target {
        peer: String,
        attribute: Option<String>,
    },
    /// `%<=`, `%=`, `%>=`
    Relation(Relation),
    /// `+n`, `-n`, `<n`, `>n`
    Constant(ConstantSign, f64),
    /// `*n`, `/n`
    Multiplier(MultiplierSign, f64),
    /// `$n`
    Priority(f64),
    /// `!name`
    Identifier(String),
}

/// Parse a single shorthand argument
pub fn parse_argument(input: &str) -> Result<Argument, Vec<ShorthandError>> {
    let invalid = invalid_spans(input);
    if !invalid.is_empty() {
        return Err(invalid
            .into_iter()
            .map(|span| ShorthandError::invalid_character(input, span))
            .collect());
    }

    let len = input.len();
    let token_iter = lex(input).map(|(tok, span)| (tok, span.into()));
    let token_stream =
        Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    argument_parser(input)
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn argument_parser<'a, I>(
    source: &'a str,
) -> impl Parser<'a, I, Argument, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let number = just(Token::Minus)
        .or_not()
        .then(select! { Token::Number(n) => n })
        .map(|(neg, n)| if neg.is_some() { -n } else { n })
        .labelled("number");

    let word = select! { Token::Word(w) => w }.labelled("name");

    // @peer.attribute
    let target = just(Token::At)
        .ignore_then(word.clone())
        .then(just(Token::Dot).ignore_then(word.clone()).or_not())
        .map(|(peer, attribute)| Argument::Target { peer, attribute });

    let relation = just(Token::Percent)
        .ignore_then(choice((
            just(Token::LessOrEqual).to(Relation::LessOrEqual),
            just(Token::GreaterOrEqual).to(Relation::GreaterOrEqual),
            just(Token::Equals).to(Relation::Equal),
            word.clone().try_map(|w, span| match w.as_str() {
                "lte" => Ok(Relation::LessOrEqual),
                "gte" => Ok(Relation::GreaterOrEqual),
                "eq" => Ok(Relation::Equal),
                _ => Err(Rich::custom(span, format!("'{}' is not a relation", w))),
            }),
        )))
        .map(Argument::Relation);

    let constant = choice((
        just(Token::Plus).to(ConstantSign::Positive),
        just(Token::Minus).to(ConstantSign::Negative),
        just(Token::Lt).to(ConstantSign::Inset),
        just(Token::Gt).to(ConstantSign::Offset),
    ))
    .then(number.clone())
    .map(|(sign, value)| Argument::Constant(sign, value));

    let multiplier = choice((
        just(Token::Star).to(MultiplierSign::Multiply),
        just(Token::Slash).to(MultiplierSign::Divide),
    ))
    .then(number.clone())
    .map(|(sign, value)| Argument::Multiplier(sign, value));

    let priority = just(Token::Dollar)
        .ignore_then(number)
        .map(Argument::Priority);

    // Identifiers are free text: everything after the `!` is kept verbatim.
    let identifier = just(Token::Bang).ignore_then(
        any()
            .repeated()
            .at_least(1)
            .map_with(move |_, e| {
                let range = span_range(&e.span());
                Argument::Identifier(source.get(range).unwrap_or_default().to_string())
            }),
    );

    choice((target, relation, constant, multiplier, priority, identifier)).then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(
            parse_argument("@superview").unwrap(),
            Argument::Target {
                peer: "superview".to_string(),
                attribute: None
            }
        );
    }

    #[test]
    fn test_parse_target_with_attribute() {
        assert_eq!(
            parse_argument("@title.bottom").unwrap(),
            Argument::Target {
                peer: "title".to_string(),
                attribute: Some("bottom".to_string())
            }
        );
    }

    #[test]
    fn test_parse_target_starting_with_digit() {
        assert_eq!(
            parse_argument("@2nd.bottom").unwrap(),
            Argument::Target {
                peer: "2nd".to_string(),
                attribute: Some("bottom".to_string())
            }
        );
    }

    #[test]
    fn test_parse_relations() {
        assert_eq!(
            parse_argument("%>=").unwrap(),
            Argument::Relation(Relation::GreaterOrEqual)
        );
        assert_eq!(
            parse_argument("%<=").unwrap(),
            Argument::Relation(Relation::LessOrEqual)
        );
        assert_eq!(parse_argument("%=").unwrap(), Argument::Relation(Relation::Equal));
        assert_eq!(
            parse_argument("%gte").unwrap(),
            Argument::Relation(Relation::GreaterOrEqual)
        );
    }

    #[test]
    fn test_parse_constants() {
        assert_eq!(
            parse_argument("+100").unwrap(),
            Argument::Constant(ConstantSign::Positive, 100.0)
        );
        assert_eq!(
            parse_argument("-8").unwrap(),
            Argument::Constant(ConstantSign::Negative, 8.0)
        );
        assert_eq!(
            parse_argument("<20").unwrap(),
            Argument::Constant(ConstantSign::Inset, 20.0)
        );
        assert_eq!(
            parse_argument(">12.5").unwrap(),
            Argument::Constant(ConstantSign::Offset, 12.5)
        );
    }

    #[test]
    fn test_parse_multipliers() {
        assert_eq!(
            parse_argument("*2").unwrap(),
            Argument::Multiplier(MultiplierSign::Multiply, 2.0)
        );
        assert_eq!(
            parse_argument("/4").unwrap(),
            Argument::Multiplier(MultiplierSign::Divide, 4.0)
        );
    }

    #[test]
    fn test_parse_priority_and_identifier() {
        assert_eq!(parse_argument("$750").unwrap(), Argument::Priority(750.0));
        assert_eq!(
            parse_argument("!header-height").unwrap(),
            Argument::Identifier("header-height".to_string())
        );
    }

    #[test]
    fn test_missing_number_is_an_error() {
        let errors = parse_argument("+").unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_unknown_relation_is_an_error() {
        let errors = parse_argument("%about").unwrap_err();
        assert!(errors[0].to_string().contains("not a relation"));
    }

    #[test]
    fn test_invalid_character_is_an_error() {
        assert!(parse_argument("+1#0").is_err());
    }

    #[test]
    fn test_trailing_tokens_are_an_error() {
        assert!(parse_argument("+10 20").is_err());
    }
}
