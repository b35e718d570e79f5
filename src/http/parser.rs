use crate::config::Limits;
use crate::http::body::{ChunkedDecoder, DecodeStatus, Framing};
use crate::http::error::HttpError;
use crate::http::request::Request;
use crate::http::scanner::{check_eol, find_eol, find_head_end, validate_method, validate_path};

/// Outcome of a parse step that did not violate the protocol.
#[derive(Debug, PartialEq, Eq)]
pub enum Progress<T> {
    /// The input ends before the current element does.
    NeedMoreData,
    Complete(T),
}

/// Parses the request line and headers once the whole header block is buffered.
///
/// `cursor` remembers how far the blank-line search got so a caller feeding
/// a growing buffer does not rescan it. On completion returns the request
/// head (no body) and the number of bytes the head occupied.
pub fn parse_head(
    buf: &[u8],
    cursor: &mut usize,
    limits: &Limits,
) -> Result<Progress<(Request, usize)>, HttpError> {
    let Some(head_end) = find_head_end(buf, cursor) else {
        return Ok(Progress::NeedMoreData);
    };

    let request = parse_head_block(&buf[..head_end], limits)?;
    Ok(Progress::Complete((request, head_end)))
}

/// Parses a whole request out of `buf`, body included.
///
/// This is the one-shot form of what the connection context does
/// incrementally; returns the request and the bytes consumed.
pub fn parse_http_request(
    buf: &[u8],
    limits: &Limits,
) -> Result<Progress<(Request, usize)>, HttpError> {
    let (mut request, head_len) = match parse_head(buf, &mut 0, limits)? {
        Progress::Complete(head) => head,
        Progress::NeedMoreData => return Ok(Progress::NeedMoreData),
    };
    let rest = &buf[head_len..];

    let body_len = match Framing::for_request(&request, limits)? {
        Framing::Empty => 0,
        Framing::Fixed(length) => {
            request.body_length = Some(length as u64);
            if rest.len() < length {
                return Ok(Progress::NeedMoreData);
            }
            request.body = rest[..length].to_vec();
            length
        }
        Framing::Chunked => {
            let mut decoder = ChunkedDecoder::new(limits.max_request_len);
            let (status, consumed) = decoder.decode(rest, &mut request.body)?;
            if status == DecodeStatus::Incomplete {
                return Ok(Progress::NeedMoreData);
            }
            request.trailers = decoder.take_trailers();
            consumed
        }
    };

    Ok(Progress::Complete((request, head_len + body_len)))
}

fn parse_head_block(mut data: &[u8], limits: &Limits) -> Result<Request, HttpError> {
    // Some clients send a stray newline before the request line.
    data = &data[check_eol(data)?..];

    let line_end = find_eol(data)?.ok_or(HttpError::InvalidLineEnding)?;
    let mut request = parse_request_line(&data[..line_end.pos], limits)?;
    data = &data[line_end.next()..];

    loop {
        if check_eol(data)? > 0 {
            break;
        }

        let end = find_eol(data)?.ok_or(HttpError::InvalidLineEnding)?;
        let (name, value) = parse_header_line(&data[..end.pos])?;
        request.headers.insert(name, value);
        data = &data[end.next()..];
    }

    Ok(request)
}

fn parse_request_line(line: &[u8], limits: &Limits) -> Result<Request, HttpError> {
    let mut parts = line.splitn(3, |&b| b == b' ');
    let (Some(method), Some(path), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(HttpError::InvalidRequestLine);
    };

    let method = validate_method(method, limits.max_method_len)?;
    let path = validate_path(path, limits.max_path_len)?;

    let version = match version {
        [b'H', b'T', b'T', b'P', b'/', b'1', b'.', digit] if digit.is_ascii_digit() => {
            format!("HTTP/1.{}", *digit as char)
        }
        _ => return Err(HttpError::InvalidVersion),
    };

    Ok(Request {
        method: method.to_string(),
        path: path.to_string(),
        version,
        ..Default::default()
    })
}

/// Splits one header line (terminator already stripped) into name and value.
///
/// The name is kept verbatim up to the first colon, including any
/// whitespace before it. Leading SP/HT is dropped from the value.
pub fn parse_header_line(line: &[u8]) -> Result<(String, String), HttpError> {
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(HttpError::InvalidHeader)?;
    if colon == 0 {
        return Err(HttpError::InvalidHeader);
    }

    let name = &line[..colon];
    let value = &line[colon + 1..];
    let start = value
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(value.len());

    let name = std::str::from_utf8(name).map_err(|_| HttpError::InvalidHeader)?;
    let value = std::str::from_utf8(&value[start..]).map_err(|_| HttpError::InvalidHeader)?;

    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let Progress::Complete((parsed, consumed)) =
            parse_http_request(req, &Limits::default()).unwrap()
        else {
            panic!("expected a complete request");
        };

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn header_line_keeps_space_before_colon() {
        let (name, value) = parse_header_line(b"Host : a").unwrap();
        assert_eq!(name, "Host ");
        assert_eq!(value, "a");
    }

    #[test]
    fn header_line_strips_leading_tabs() {
        let (_, value) = parse_header_line(b"X-Tab:\t \tv  ").unwrap();
        assert_eq!(value, "v  ");
    }
}
