use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ExprError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character {0:?} at {1}")]
    UnexpectedChar(char, usize),

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("expression ended early")]
    UnexpectedEnd,

    #[error("unknown name {0:?}")]
    UnknownName(String),

    #[error("bad number {0:?}")]
    BadNumber(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Abs,
    Ln,
    Log,
    Exp,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            "ln" => Func::Ln,
            "log" => Func::Log,
            "exp" => Func::Exp,
            _ => return None,
        })
    }

    fn call(self, v: f64) -> f64 {
        match self {
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Sqrt => v.sqrt(),
            Func::Abs => v.abs(),
            Func::Ln => v.ln(),
            Func::Log => v.log10(),
            Func::Exp => v.exp(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    X,
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    /// Undefined points (division by zero, `sqrt(-1)`, ...) come back as
    /// non-finite values rather than errors.
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Num(v) => *v,
            Expr::X => x,
            Expr::Neg(e) => -e.eval(x),
            Expr::Call(f, e) => f.call(e.eval(x)),
            Expr::Bin(op, l, r) => {
                let (a, b) = (l.eval(x), r.eval(x));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => a.powf(b),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Num(v) => format!("number {v}"),
            Token::Ident(s) => format!("name {s:?}"),
            Token::Op(c) => format!("operator {c:?}"),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = src.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let v = text.parse().map_err(|_| ExprError::BadNumber(text.clone()))?;
                out.push(Token::Num(v));
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect::<String>().to_ascii_lowercase();
                split_word(&word, &mut out)?;
            }
            '+' | '-' | '*' | '/' | '^' => {
                out.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                out.push(Token::LParen);
                i += 1;
            }
            ')' => {
                out.push(Token::RParen);
                i += 1;
            }
            other => return Err(ExprError::UnexpectedChar(other, i)),
        }
    }
    Ok(out)
}

/// Splits glued names such as `xsin` or `pix` into known identifiers.
fn split_word(word: &str, out: &mut Vec<Token>) -> Result<(), ExprError> {
    const NAMES: [&str; 11] = ["sqrt", "sin", "cos", "tan", "abs", "exp", "log", "ln", "pi", "x", "e"];
    let mut rest = word;
    while !rest.is_empty() {
        let name = NAMES
            .iter()
            .find(|n| rest.starts_with(*n))
            .ok_or_else(|| ExprError::UnknownName(rest.to_string()))?;
        out.push(Token::Ident(name.to_string()));
        rest = &rest[name.len()..];
    }
    Ok(())
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(c @ ('+' | '-'))) = self.peek() {
            let op = if *c == '+' { BinOp::Add } else { BinOp::Sub };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Op('*')) => BinOp::Mul,
                Some(Token::Op('/')) => BinOp::Div,
                // implicit product: 2x, 3(x+1), (x)(x)
                Some(Token::Num(_) | Token::Ident(_) | Token::LParen) => {
                    let rhs = self.power()?;
                    lhs = Expr::Bin(BinOp::Mul, Box::new(lhs), Box::new(rhs));
                    continue;
                }
                _ => break,
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, ExprError> {
        let base = self.primary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            // right-associative, and 2^-x is allowed
            let exp = self.unary()?;
            return Ok(Expr::Bin(BinOp::Pow, Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Some(Token::Num(v)) => Ok(Expr::Num(v)),
            Some(Token::Ident(name)) => match name.as_str() {
                "x" => Ok(Expr::X),
                "pi" => Ok(Expr::Num(std::f64::consts::PI)),
                "e" => Ok(Expr::Num(std::f64::consts::E)),
                other => {
                    let func = Func::from_name(other).ok_or_else(|| ExprError::UnknownName(other.to_string()))?;
                    // sin(x)^2 squares the call; bare sin x^2 takes the power
                    let arg = match self.peek() {
                        Some(Token::LParen) => self.primary()?,
                        _ => self.power()?,
                    };
                    Ok(Expr::Call(func, Box::new(arg)))
                }
            },
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(t) => Err(ExprError::UnexpectedToken(t.describe())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(t) => Err(ExprError::UnexpectedToken(t.describe())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// Drops whitespace and a leading `y=` so `y = x^2` and `x^2` are the same.
pub fn clean(src: &str) -> String {
    let compact: String = src.chars().filter(|c| !c.is_whitespace()).collect();
    let lower = compact.to_ascii_lowercase();
    match lower.strip_prefix("y=") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

pub fn parse(src: &str) -> Result<Expr, ExprError> {
    let cleaned = clean(src);
    let tokens = tokenize(&cleaned)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut p = Parser { tokens, pos: 0 };
    let expr = p.expr()?;
    match p.next() {
        None => Ok(expr),
        Some(t) => Err(ExprError::UnexpectedToken(t.describe())),
    }
}
