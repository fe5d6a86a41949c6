use unsegen::input::*;

use nom::{
    character::complete::{alpha1, space1},
    combinator::{all_consuming, opt, rest},
    error::{ErrorKind as NomErrorKind, ParseError},
    sequence::{pair, preceded},
    Err, IResult,
};

use super::context::{Context, Mode, Status};
use crate::error::{Error, ErrorKind};
use crate::paper::PageLayoutMode;

pub struct CommandParser<'a> {
    context: &'a mut Context,
}

pub fn match_action<'t, Act>(
    table: &'t [(&'static str, Act)],
) -> impl Fn(&str) -> IResult<&str, &'t Act> + 't {
    move |input| {
        let (remaining, name) = alpha1(input)?;
        match table.iter().find(|(n, _)| *n == name) {
            Some((_, act)) => Ok((remaining, act)),
            None => Err(Err::Failure(ParseError::from_error_kind(
                input,
                NomErrorKind::Tag,
            ))),
        }
    }
}

impl<'a> CommandParser<'a> {
    pub fn new(context: &'a mut Context) -> Self {
        CommandParser { context }
    }

    pub fn run_command(&mut self, cmd: &str) -> ActionResult {
        let cmd = cmd.trim();
        let (_, (act, arg)) = all_consuming(pair(
            match_action(COMMANDS),
            opt(preceded(space1, rest)),
        ))(cmd)
        .map_err(|_: Err<nom::error::Error<&str>>| {
            Error::new(
                ErrorKind::InvalidArgument,
                &format!("Not a command: '{}'", cmd),
            )
        })?;

        match (act, arg) {
            (Action::Arg(a), arg) => a(self.context, arg),
            (Action::NoArg(a), None) => a(self.context),
            (Action::NoArg(_), Some(_)) => Err(Error::new(
                ErrorKind::InvalidArgument,
                &format!("'{}' takes no argument", cmd),
            )),
        }
    }

    fn report_error(&mut self, error: Error) {
        self.context.status = Some(Status::Error(format!("{}", error)));
    }
}

impl Behavior for CommandParser<'_> {
    fn input(mut self, input: Input) -> Option<Input> {
        if let Event::Key(Key::Char('\n')) = input.event {
            let cmd = self.context.command_line.finish_line().to_owned();
            self.context.mode = Mode::Normal;
            if let Err(e) = self.run_command(&cmd) {
                self.report_error(e);
            }
            None
        } else {
            Some(input)
        }
    }
}

pub type ActionResult = Result<(), Error>;

pub enum Action {
    /// Argument is optional; `None` when the command was given bare.
    Arg(fn(&mut Context, Option<&str>) -> ActionResult),
    NoArg(fn(&mut Context) -> ActionResult),
}

fn required<'s>(arg: Option<&'s str>, what: &str) -> Result<&'s str, Error> {
    arg.ok_or_else(|| Error::new(ErrorKind::InvalidArgument, &format!("Missing {}", what)))
}

const COMMANDS: &[(&str, Action)] = &[
    (
        "year",
        Action::Arg(|c, arg| {
            let year = required(arg, "year")?.parse::<i32>().map_err(|_| {
                Error::new(ErrorKind::InvalidArgument, "Year must be a number")
            })?;
            c.set_year(year)
        }),
    ),
    (
        "next",
        Action::NoArg(|c| {
            let year = c.state().selected_year + 1;
            c.set_year(year)
        }),
    ),
    (
        "prev",
        Action::NoArg(|c| {
            let year = c.state().selected_year - 1;
            c.set_year(year)
        }),
    ),
    (
        "lang",
        Action::Arg(|c, arg| {
            let language = match arg {
                Some(code) => code.parse()?,
                None => c.state().language.toggled(),
            };
            c.set_language(language);
            Ok(())
        }),
    ),
    (
        "axis",
        Action::Arg(|c, arg| {
            let axis = match arg {
                Some(axis) => axis.parse()?,
                None => c.state().axis.toggled(),
            };
            c.set_axis(axis);
            Ok(())
        }),
    ),
    (
        "paper",
        Action::Arg(|c, arg| {
            let size = required(arg, "paper size")?.parse()?;
            c.set_paper_size(size);
            Ok(())
        }),
    ),
    (
        "page",
        Action::Arg(|c, arg| {
            let orientation = required(arg, "page orientation")?.parse()?;
            c.set_page_orientation(orientation);
            Ok(())
        }),
    ),
    (
        "layout",
        Action::Arg(|c, arg| {
            let mode = match arg {
                Some(mode) => mode.parse()?,
                None => match c.paper.page_layout_mode {
                    PageLayoutMode::Single => PageLayoutMode::TwoPage,
                    PageLayoutMode::TwoPage => PageLayoutMode::Single,
                },
            };
            c.set_layout_mode(mode);
            Ok(())
        }),
    ),
    (
        "export",
        Action::NoArg(|c| {
            c.request_export();
            Ok(())
        }),
    ),
    (
        "clear",
        Action::NoArg(|c| {
            c.clear_year();
            Ok(())
        }),
    ),
    (
        "q",
        Action::NoArg(|c| {
            c.quit = true;
            Ok(())
        }),
    ),
];
